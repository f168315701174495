//! A simple example scoring a Bloom filter against exact membership.
use std::collections::HashSet;

use bloom_eval::{evaluate, BloomFilter};

fn main() -> Result<(), bloom_eval::Error> {
    let reference = ["foo", "bar"];
    let mut bf = BloomFilter::new(1024, 4)?;
    let truth: HashSet<Vec<u8>> = reference.iter().map(|s| s.as_bytes().to_vec()).collect();

    for item in reference {
        bf.insert(item);
    }

    let queries = ["foo", "bar", "baz"]
        .into_iter()
        .map(|q| Ok(q.as_bytes().to_vec()));
    let confusion = evaluate(&bf, queries, &truth, |query, verdict| {
        println!("{}: {}", String::from_utf8_lossy(query), verdict);
        Ok(())
    })?;
    println!("{}", confusion);

    Ok(())
}
