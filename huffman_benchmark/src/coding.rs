use std::{error::Error, fmt::Debug, fs::File, hash::Hash, path::Path};
use std::io::{self, BufReader, BufWriter, Write};

use dyn_size_of::GetSize;
use huffman_codec::{alphabet, BitBuffer, Codec, FrequencyTable};

use crate::{compare_symbols, Conf};

type WriteSymbol<S> = fn(&mut dyn io::Write, &S) -> io::Result<()>;
type ReadSymbol<S> = fn(&mut dyn io::Read) -> io::Result<S>;

pub fn benchmark_text(conf: &Conf) -> Result<(), Box<dyn Error>> {
    benchmark("Text", conf, &conf.text(), alphabet::write_char, alphabet::read_char)
}

pub fn benchmark_bytes(conf: &Conf) -> Result<(), Box<dyn Error>> {
    benchmark("Bytes", conf, &conf.bytes()?, alphabet::write_byte, alphabet::read_byte)
}

fn benchmark<S>(label: &str, conf: &Conf, symbols: &[S], write_symbol: WriteSymbol<S>, read_symbol: ReadSymbol<S>)
    -> Result<(), Box<dyn Error>>
    where S: Eq + Hash + Clone + Debug + GetSize
{
    println!("{label} of {} symbols", symbols.len());
    println!("Counting symbol occurrences [ns]: {:.0}", conf.measure(||
        FrequencyTable::<S>::with_counted_all(symbols)
    ) * 1e9);
    let frequencies = FrequencyTable::with_counted_all(symbols);
    println!("Distinct symbols: {}, entropy [bits/symbol]: {:.4}", frequencies.len(), frequencies.entropy());

    println!("Codec construction [ns]: {:.0}", conf.measure(|| Codec::from_frequencies(&frequencies)) * 1e9);
    let codec = Codec::from_frequencies(&frequencies)?;
    println!("Codec size [bytes]: {}, longest code [bits]: {}", codec.size_bytes(), codec.tree().depth());

    conf.print_speed("Encoding", conf.measure(|| codec.encode(symbols)));
    let bits = codec.encode(symbols)?;
    println!("Encoded size [bits/symbol]: {:.4}", bits.len() as f64 / symbols.len() as f64);

    conf.print_speed("Decoding", conf.measure(|| codec.decode(&bits)));

    if conf.verify {
        print!("Verification... ");
        compare_symbols(symbols, &codec.decode(&bits)?);
    }

    if let Some(path) = &conf.save {
        save(path, &codec, &bits, write_symbol)?;
        print!("Verification of {}... ", path.display());
        let (frequencies, payload) = load(path, read_symbol)?;
        let rebuilt = Codec::from_frequencies(&frequencies)?;
        compare_symbols(symbols, &rebuilt.decode(&payload)?);
    }
    Ok(())
}

/// Writes the frequency table of the `codec` followed by the `bits` to the file at `path`.
fn save<S>(path: &Path, codec: &Codec<S>, bits: &BitBuffer, write_symbol: WriteSymbol<S>) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    codec.tree().frequencies().write(&mut file, write_symbol)?;
    bits.write(&mut file)?;
    file.flush()
}

/// Reads (written by `save`) frequency table and bits from the file at `path`.
fn load<S: Eq + Hash + Clone>(path: &Path, read_symbol: ReadSymbol<S>) -> io::Result<(FrequencyTable<S>, BitBuffer)> {
    let mut file = BufReader::new(File::open(path)?);
    let frequencies = FrequencyTable::read(&mut file, read_symbol)?;
    let bits = BitBuffer::read(&mut file)?;
    Ok((frequencies, bits))
}
