//! Very thin FASTA reader and FASTA/PHYLIP writers. Only support batch IO.
use std::io::{BufRead, BufReader};
use std::io::{BufWriter, Write};
pub type FASTARecord = (String, Vec<u8>);

// Width of a PHYLIP line.
const PRINT_SIZE: usize = 100;

/// Write records into the writer
pub fn write_fasta<W: Write>(
    wtr: &mut BufWriter<W>,
    records: &[FASTARecord],
) -> std::io::Result<()> {
    for (id, seq) in records {
        writeln!(wtr, ">{}\n{}", id, String::from_utf8_lossy(seq))?;
    }
    Ok(())
}

/// Write aligned records in the interleaved PHYLIP format.
/// The first block carries the names, the following blocks are `PRINT_SIZE` columns each.
pub fn write_phylip<W: Write>(
    wtr: &mut BufWriter<W>,
    records: &[FASTARecord],
) -> std::io::Result<()> {
    let len = records.first().map(|r| r.1.len()).unwrap_or(0);
    writeln!(wtr, "{} {}", records.len(), len)?;
    let longest = records.iter().map(|r| r.0.len()).max().unwrap_or(0);
    let first = PRINT_SIZE.saturating_sub(4 + longest).min(len);
    for (id, seq) in records {
        let block = &seq[..first.min(seq.len())];
        writeln!(wtr, "{}\t{}", id, String::from_utf8_lossy(block))?;
    }
    writeln!(wtr)?;
    let mut start = first;
    while start < len {
        for (_, seq) in records {
            let block = seq.get(start..(start + PRINT_SIZE).min(seq.len()));
            let block = block.unwrap_or(&[]);
            writeln!(wtr, "{}", String::from_utf8_lossy(block))?;
        }
        writeln!(wtr)?;
        start += PRINT_SIZE;
    }
    Ok(())
}

/// Read file or stdin, return parsed fasta files.
/// If the record is mulformed, it is skipped.
pub fn read_fasta<P: AsRef<std::path::Path>>(
    file: &Option<P>,
) -> std::io::Result<Vec<FASTARecord>> {
    let stdin = std::io::stdin();
    let mut reader: Box<dyn BufRead> = match file {
        Some(file) => std::fs::File::open(file)
            .map(BufReader::new)
            .map(Box::new)?,
        None => {
            let lock = stdin.lock();
            Box::new(BufReader::new(lock))
        }
    };
    let mut contents = vec![];
    reader.read_to_end(&mut contents)?;
    Ok(parse_fasta(&contents))
}

pub fn parse_fasta(contents: &[u8]) -> Vec<FASTARecord> {
    let mut records = vec![];
    let mut current: Option<FASTARecord> = None;
    let lines = contents
        .split(|&x| x == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .filter(|line| !line.is_empty() && !line.starts_with(b";"));
    for line in lines {
        if let Some(header) = line.strip_prefix(b">") {
            records.extend(current.take());
            let id = header
                .split(|x| x.is_ascii_whitespace())
                .find(|x| !x.is_empty())
                .unwrap_or(&[]);
            current = Some((String::from_utf8_lossy(id).to_string(), vec![]));
        } else if let Some((_, seq)) = current.as_mut() {
            seq.extend(line.iter().filter(|x| !x.is_ascii_whitespace()));
        }
    }
    records.extend(current);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn parse() {
        let contents = b";comment\n>1 first\nCTCT\nGG\n\n>2\r\nCCTGG\r\n";
        let records = parse_fasta(contents);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], ("1".to_string(), b"CTCTGG".to_vec()));
        assert_eq!(records[1], ("2".to_string(), b"CCTGG".to_vec()));
        assert!(parse_fasta(b"").is_empty());
    }
    #[test]
    fn fasta_out() {
        let records = vec![("1".to_string(), b"CTCTGG".to_vec())];
        let mut wtr = BufWriter::new(vec![]);
        write_fasta(&mut wtr, &records).unwrap();
        let written = wtr.into_inner().unwrap();
        assert_eq!(written, b">1\nCTCTGG\n".to_vec());
    }
    #[test]
    fn phylip_out() {
        let records = vec![
            ("1".to_string(), b"CTCTGG".to_vec()),
            ("2".to_string(), b"C-CTGG".to_vec()),
        ];
        let mut wtr = BufWriter::new(vec![]);
        write_phylip(&mut wtr, &records).unwrap();
        let written = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert_eq!(written, "2 6\n1\tCTCTGG\n2\tC-CTGG\n\n");
        // 95 columns in the first block, 100 in the next.
        let records = vec![
            ("a".to_string(), vec![b'A'; 200]),
            ("b".to_string(), vec![b'C'; 200]),
        ];
        let mut wtr = BufWriter::new(vec![]);
        write_phylip(&mut wtr, &records).unwrap();
        let written = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        let lines: Vec<_> = written.lines().collect();
        assert_eq!(lines[0], "2 200");
        assert_eq!(lines[1].len(), 2 + 95);
        assert_eq!(lines[3], "");
        assert_eq!(lines[4].len(), 100);
        assert_eq!(lines[7].len(), 5);
        assert_eq!(lines.len(), 10);
    }
}
