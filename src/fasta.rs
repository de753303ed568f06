//! fasta file parsing and aggregation.
//!
//! Sequences are parsed with needletail, so plain and gzipped fasta files are
//! both accepted. Clustering only needs sequence lengths, so sequence text is
//! dropped as soon as a record has been measured.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};

/// extracts the record identifier : first whitespace delimited token of the header.
fn id_token(header: &[u8]) -> anyhow::Result<String> {
    let token = header
        .split(|c: &u8| c.is_ascii_whitespace())
        .next()
        .unwrap_or(header);
    let id = std::str::from_utf8(token).with_context(|| "non utf8 fasta identifier")?;
    Ok(id.to_string())
}

// needletail cannot open an empty or marker-less file, but such a file is a
// legitimate (empty) record source for us. Returns true if there is a record to parse.
fn has_fasta_records(path: &Path) -> anyhow::Result<bool> {
    let mut file = File::open(path).with_context(|| format!("cannot open fasta file {:?}", path))?;
    let mut buf = [0u8; 1];
    loop {
        let nb_read = file.read(&mut buf)?;
        if nb_read == 0 {
            return Ok(false);
        }
        if buf[0] == 0x1f {
            // gzip magic, defer to needletail decompression
            return Ok(true);
        }
        if !buf[0].is_ascii_whitespace() {
            return Ok(buf[0] == b'>');
        }
    }
} // end of has_fasta_records

/// opens and parses a fasta file with needletail, returning the mapping
/// identifier -> sequence length (residue count, line terminators excluded).
/// Duplicate identifiers are last-wins as later records overwrite earlier ones.
pub fn read_fasta_lengths(path: &Path) -> anyhow::Result<HashMap<String, usize>> {
    let mut lengths = HashMap::<String, usize>::new();
    if !has_fasta_records(path)? {
        log::warn!("no fasta record found in {:?}", path);
        return Ok(lengths);
    }
    let mut reader = needletail::parse_fastx_file(path)
        .with_context(|| format!("cannot parse fasta file {:?}", path))?;
    while let Some(record) = reader.next() {
        let seqrec = record.with_context(|| format!("bad record in file {:?}", path))?;
        let id = id_token(seqrec.id())?;
        lengths.insert(id, seqrec.num_bases());
    }
    log::debug!("read_fasta_lengths {:?}, nb sequences : {}", path, lengths.len());
    Ok(lengths)
} // end of read_fasta_lengths

/// number of records in a fasta file
pub fn count_fasta_records(path: &Path) -> anyhow::Result<usize> {
    if !has_fasta_records(path)? {
        return Ok(0);
    }
    let mut nb_records = 0;
    let mut reader = needletail::parse_fastx_file(path)
        .with_context(|| format!("cannot parse fasta file {:?}", path))?;
    while let Some(record) = reader.next() {
        let _ = record.with_context(|| format!("bad record in file {:?}", path))?;
        nb_records += 1;
    }
    Ok(nb_records)
} // end of count_fasta_records

// returns true if file is a fasta file
// filenames are of type somevirus.fa[sta] or contigs.fna
fn is_fasta_file(path: &Path) -> bool {
    match path.file_name().and_then(|f| f.to_str()) {
        Some(name) => {
            name.ends_with(".fa") || name.ends_with(".fasta") || name.ends_with(".fna")
        }
        None => false,
    }
} // end of is_fasta_file

/// concatenates all fasta files of a directory into output_path, in sorted
/// filename order, and returns the list of files aggregated.
/// It is an error if the directory contains no fasta file.
pub fn aggregate_fasta_dir(input_dir: &Path, output_path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut fasta_files = Vec::<PathBuf>::new();
    for entry in fs::read_dir(input_dir)
        .with_context(|| format!("cannot read input directory {:?}", input_dir))?
    {
        let path = entry?.path();
        if path.is_file() && is_fasta_file(&path) {
            fasta_files.push(path);
        }
    }
    fasta_files.sort();
    fasta_files.dedup();
    if fasta_files.is_empty() {
        return Err(anyhow!(
            "no fasta files (*.fa, *.fasta, *.fna) found in {:?}",
            input_dir
        ));
    }
    //
    let out = File::create(output_path)
        .with_context(|| format!("cannot create aggregated file {:?}", output_path))?;
    let mut writer = BufWriter::new(out);
    for fasta_path in &fasta_files {
        let mut reader = File::open(fasta_path)
            .with_context(|| format!("cannot open fasta file {:?}", fasta_path))?;
        io::copy(&mut reader, &mut writer)?;
    }
    writer.flush()?;
    log::info!(
        "aggregated {} fasta files into {:?}",
        fasta_files.len(),
        output_path
    );
    Ok(fasta_files)
} // end of aggregate_fasta_dir

//===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_read_fasta_lengths() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "sample.fa",
            ">genome_a some description\nATGCGT\nACGTA\n\n>genome_b\nATGC\n>genome_c\nAT\n",
        );
        let lengths = read_fasta_lengths(&path).unwrap();
        assert_eq!(lengths.len(), 3);
        assert_eq!(lengths["genome_a"], 11);
        assert_eq!(lengths["genome_b"], 4);
        assert_eq!(lengths["genome_c"], 2);
    }

    #[test]
    fn test_read_fasta_lengths_duplicate_id_last_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "dup.fa", ">g1\nAAAA\n>g1\nAA\n");
        let lengths = read_fasta_lengths(&path).unwrap();
        assert_eq!(lengths.len(), 1);
        assert_eq!(lengths["g1"], 2);
    }

    #[test]
    fn test_read_fasta_lengths_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "empty.fa", "");
        let lengths = read_fasta_lengths(&path).unwrap();
        assert!(lengths.is_empty());
    }

    #[test]
    fn test_read_fasta_lengths_no_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "nomarker.fa", "ATGC\nATGC\n");
        let lengths = read_fasta_lengths(&path).unwrap();
        assert!(lengths.is_empty());
    }

    #[test]
    fn test_read_fasta_lengths_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let res = read_fasta_lengths(&dir.path().join("absent.fa"));
        assert!(res.is_err());
    }

    #[test]
    fn test_count_fasta_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "sample.fa", ">a\nAT\n>b\nATG\n");
        assert_eq!(count_fasta_records(&path).unwrap(), 2);
    }

    #[test]
    fn test_aggregate_fasta_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "b.fa", ">b\nATG\n");
        write_file(dir.path(), "a.fasta", ">a\nAT\n");
        write_file(dir.path(), "notes.txt", "not a fasta\n");
        let out_dir = tempfile::tempdir().unwrap();
        let out_path = out_dir.path().join("all_genomes.fa");
        let files = aggregate_fasta_dir(dir.path(), &out_path).unwrap();
        assert_eq!(files.len(), 2);
        let content = fs::read_to_string(&out_path).unwrap();
        // sorted filename order : a.fasta before b.fa
        assert_eq!(content, ">a\nAT\n>b\nATG\n");
        assert_eq!(count_fasta_records(&out_path).unwrap(), 2);
    }

    #[test]
    fn test_aggregate_fasta_dir_empty_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let res = aggregate_fasta_dir(dir.path(), &out_dir.path().join("all.fa"));
        assert!(res.is_err());
    }
}
