#![doc = include_str!("../README.md")]
mod coding;

use std::{error::Error, fmt::Debug, hint::black_box, path::PathBuf, time::Instant};

use clap::{Parser, Subcommand};

use rand::prelude::*;
use rand::distributions::{WeightedError, WeightedIndex};
use rand_pcg::Pcg64Mcg;

#[derive(Subcommand)]
pub enum Input {
    /// Lorem ipsum text, encoded character by character
    #[clap(visible_alias = "t")]
    Text,
    /// Pseudo-random bytes
    #[clap(visible_alias = "b")]
    Bytes,
    /// Tests all kinds of input
    All
}

#[derive(Parser)]
#[command(author, version, about, long_about = None, infer_subcommands=true)]
/// Huffman codec benchmark.
pub struct Conf {
    /// Kind of input to test
    #[command(subcommand)]
    pub input: Input,

    /// Length of the test input, in symbols
    #[arg(short = 'l', long, default_value_t = 1024*1024)]
    pub len: usize,

    /// Number of different symbols in the random bytes.
    #[arg(long, default_value_t = 256, value_parser = clap::value_parser!(u16).range(2..=256))]
    pub symbols: u16,

    /// The spread of the number of symbols in the random bytes (0 for all about equal).
    /// Each successive symbol occurs 1+SPREAD/1000 times more often than the previous one.
    #[arg(short = 'r', long, default_value_t = 100)]
    pub spread: u32,

    /// Time (in seconds) of measuring and warming up the CPU cache before measuring
    #[arg(short='t', long, default_value_t = 5)]
    pub time: u16,

    /// Whether to check the validity
    #[arg(long, default_value_t = false)]
    pub verify: bool,

    /// Seed for random number generators
    #[arg(short='s', long, default_value_t = 1234)]
    pub seed: u64,

    /// Write the frequency table and the encoded input to the file, read them back and check the decoded result
    #[arg(long)]
    pub save: Option<PathBuf>,
}

const LOREM_IPSUM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Sed non risus. \
Suspendisse lectus tortor, dignissim sit amet, adipiscing nec, ultricies sed, dolor. Cras elementum ultrices diam. \
Maecenas ligula massa, varius a, semper congue, euismod non, mi.";

impl Conf {
    /// Returns lorem ipsum text of `len` characters.
    fn text(&self) -> Vec<char> {
        LOREM_IPSUM.chars().cycle().take(self.len).collect()
    }

    /// Returns pseudo-random bytes for testing. Each of `symbols` values occurs at least once.
    fn bytes(&self) -> Result<Box<[u8]>, WeightedError> {
        if self.len <= self.symbols as usize { return Ok((0..self.len).map(|v| v as u8).collect()); }
        let spread = 1.0 + self.spread as f64*0.001;
        let weights: Vec<_> = (1..=self.symbols as i32).map(|v| spread.powi(v)).collect();
        let dist = WeightedIndex::new(weights)?;
        let rng = Pcg64Mcg::seed_from_u64(self.seed);

        Ok((0..self.symbols).map(|v| v as u8).chain(
            dist.sample_iter(rng).map(|v| v as u8).take(self.len - self.symbols as usize)
        ).collect())
    }

    /// Returns the average time (in seconds) of calling `f`, measured after warming up for `time` seconds.
    #[inline(always)] fn measure<R, F>(&self, mut f: F) -> f64
     where F: FnMut() -> R
    {
        let mut iters = 1;
        if self.time > 0 {
            let time = Instant::now();
            loop {
                black_box(f());
                if time.elapsed().as_secs() > self.time as u64 { break; }
                iters += 1;
            }
        }
        let start_moment = Instant::now();
        for _ in 0..iters { black_box(f()); }
        start_moment.elapsed().as_secs_f64() / iters as f64
    }

    fn print_speed(&self, label: &str, sec: f64) {
        let millions = self.len as f64 / 1_000_000.0;
        println!("{}: {:.2} ms, {:.1} M symbols/sec", label, sec * 1000.0, millions / sec);
    }
}

/// Prints whether `decoded` equals `original`, and if not, where they differ.
fn compare_symbols<S: PartialEq + Debug>(original: &[S], decoded: &[S]) {
    if original.len() == decoded.len() {
        for (i, (e, g)) in original.iter().zip(decoded).enumerate() {
            if e != g {
                println!("FAIL: decoded symbol at index {} is {:?}, while the original is {:?}", i, g, e);
                return;
            }
        }
    } else {
        println!("FAIL: decoded sequence has length {} different from original {}", decoded.len(), original.len());
        return;
    }
    println!("DONE")
}

fn main() -> Result<(), Box<dyn Error>> {
    let conf: Conf = Conf::parse();
    match conf.input {
        Input::Text => coding::benchmark_text(&conf),
        Input::Bytes => coding::benchmark_bytes(&conf),
        Input::All => {
            coding::benchmark_text(&conf)?;
            coding::benchmark_bytes(&conf)
        },
    }
}
