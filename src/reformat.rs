//! reformats the raw skani edge list into the tabular form expected by the
//! graph builder.
//!
//! skani triangle -E outputs a header line and then rows :
//! query, target, ani (percent), query coverage and target coverage (fractions in [0,1]).
//! We emit 6 columns : query, target, the constant 1, ani, and both coverages
//! scaled to percentages, all numerics with two decimals.
//! Rows with missing or non numeric fields are dropped, skani outputs on large
//! collections can carry truncated trailing lines and we must not abort on them.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::Context;

/// normalizes raw comparison rows read from `input` into `output`.
/// The first line is a header and is skipped. Returns the number of rows kept.
pub fn reformat_ani<R: BufRead, W: Write>(input: R, output: &mut W) -> std::io::Result<usize> {
    let mut nb_kept = 0;
    let mut lines = input.lines();
    // header line, absent on an empty input
    if lines.next().is_none() {
        return Ok(0);
    }
    for line in lines {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 5 {
            log::trace!("dropping short row : {}", line);
            continue;
        }
        let ani = fields[2].parse::<f64>();
        let qcov = fields[3].parse::<f64>();
        let tcov = fields[4].parse::<f64>();
        match (ani, qcov, tcov) {
            (Ok(ani), Ok(qcov), Ok(tcov)) => {
                writeln!(
                    output,
                    "{}\t{}\t1\t{:.2}\t{:.2}\t{:.2}",
                    fields[0],
                    fields[1],
                    ani,
                    qcov * 100.,
                    tcov * 100.
                )?;
                nb_kept += 1;
            }
            _ => {
                log::trace!("dropping non numeric row : {}", line);
            }
        }
    }
    Ok(nb_kept)
} // end of reformat_ani

/// reformats the skani output file at input_path into output_path.
pub fn format_skani_output(input_path: &Path, output_path: &Path) -> anyhow::Result<usize> {
    let input = File::open(input_path)
        .with_context(|| format!("cannot open skani output {:?}", input_path))?;
    let output = File::create(output_path)
        .with_context(|| format!("cannot create formatted ani file {:?}", output_path))?;
    let mut writer = BufWriter::new(output);
    let nb_kept = reformat_ani(BufReader::new(input), &mut writer)?;
    writer.flush()?;
    log::info!(
        "format_skani_output {:?}, nb rows kept : {}",
        output_path,
        nb_kept
    );
    Ok(nb_kept)
} // end of format_skani_output

//===========================================================================
