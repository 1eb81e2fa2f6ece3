//! Stats command implementation.
//!
//! Empirical entropy of a file under zero-, first- and second-order context
//! models, optionally compared with a compressed and a decoded copy.

use std::collections::HashMap;
use std::path::Path;

/// Order-0 entropy H(X) in bits per symbol.
pub fn entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut counts = [0u64; 256];
    for &b in data {
        counts[b as usize] += 1;
    }

    let total = data.len() as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Conditional entropy H(X|X) given the previous byte.
pub fn conditional_entropy_1(data: &[u8]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }

    let mut context = [0u64; 256];
    let mut pairs = vec![0u64; 256 * 256];
    for window in data.windows(2) {
        context[window[0] as usize] += 1;
        pairs[((window[0] as usize) << 8) | window[1] as usize] += 1;
    }

    let total = (data.len() - 1) as f64;
    pairs
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c > 0)
        .map(|(pair, &c)| {
            let p_ab = c as f64 / total;
            let p_a = context[pair >> 8] as f64 / total;
            -p_ab * (p_ab / p_a).log2()
        })
        .sum()
}

/// Conditional entropy H(X|XX) given the previous two bytes.
pub fn conditional_entropy_2(data: &[u8]) -> f64 {
    if data.len() < 3 {
        return 0.0;
    }

    let mut context: HashMap<[u8; 2], u64> = HashMap::new();
    let mut triples: HashMap<[u8; 3], u64> = HashMap::new();
    for window in data.windows(3) {
        *context.entry([window[0], window[1]]).or_default() += 1;
        *triples.entry([window[0], window[1], window[2]]).or_default() += 1;
    }

    let total = (data.len() - 2) as f64;
    triples
        .iter()
        .map(|(triple, &c)| {
            let p_abc = c as f64 / total;
            let p_ab = context[&[triple[0], triple[1]]] as f64 / total;
            -p_abc * (p_abc / p_ab).log2()
        })
        .sum()
}

/// Position of the first differing byte, or `None` when identical.
pub fn first_difference(a: &[u8], b: &[u8]) -> Option<usize> {
    a.iter()
        .zip(b)
        .position(|(x, y)| x != y)
        .or_else(|| (a.len() != b.len()).then(|| a.len().min(b.len())))
}

pub fn cmd_stats(
    file: &Path,
    compressed: Option<&Path>,
    decoded: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(file)?;
    log::debug!("computing statistics over {} bytes", data.len());

    println!("File: {}", file.display());
    println!("Size: {} bytes", data.len());
    println!("H(X)    = {:.4} bits/symbol", entropy(&data));
    println!("H(X|X)  = {:.4} bits/symbol", conditional_entropy_1(&data));
    println!("H(X|XX) = {:.4} bits/symbol", conditional_entropy_2(&data));

    if let Some(path) = compressed {
        let size = std::fs::metadata(path)?.len();
        println!();
        println!("Compressed: {} ({} bytes)", path.display(), size);
        if !data.is_empty() {
            println!(
                "Average bits per symbol: {:.4}",
                size as f64 * 8.0 / data.len() as f64
            );
        }
    }

    if let Some(path) = decoded {
        let other = std::fs::read(path)?;
        println!();
        match first_difference(&data, &other) {
            None => println!("{} is identical", path.display()),
            Some(at) if data.len() != other.len() && at == data.len().min(other.len()) => {
                println!(
                    "{} differs in size: {} vs {} bytes",
                    path.display(),
                    data.len(),
                    other.len()
                );
                std::process::exit(2);
            }
            Some(at) => {
                println!("{} differs at byte {}", path.display(), at);
                std::process::exit(2);
            }
        }
    }

    Ok(())
}
