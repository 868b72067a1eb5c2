//! Line format read by `kvsqlite batch`.

use eyre::{bail, Result};
use kvsqlite::WriteBatch;

/// Parses `put KEY VALUE` and `del KEY` lines into one batch.
///
/// Blank lines and lines starting with `#` are skipped. A put value is the
/// rest of the line after the key and may contain spaces.
pub fn parse_batch(input: &str) -> Result<WriteBatch<String, String>> {
    let mut batch = WriteBatch::new();
    for (index, line) in input.lines().enumerate() {
        let number = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (op, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(op, rest)| (op, rest.trim_start()));
        match op {
            "put" => {
                let Some((key, value)) = rest.split_once(char::is_whitespace) else {
                    bail!("line {number}: expected `put KEY VALUE`");
                };
                batch.put(key, value.trim_start());
            }
            "del" => {
                if rest.is_empty() || rest.contains(char::is_whitespace) {
                    bail!("line {number}: expected `del KEY`");
                }
                batch.del(rest);
            }
            other => bail!("line {number}: unknown operation `{other}`"),
        }
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use kvsqlite::BatchOp;

    use super::*;

    #[test]
    fn parses_puts_and_deletes_in_order() {
        let batch = parse_batch("# seed\nput a 1\n\nput b two words\ndel a\n").expect("parse");
        let ops: Vec<_> = batch.iter().cloned().collect();
        assert_eq!(
            ops,
            vec![
                BatchOp::Put {
                    key: "a".to_string(),
                    value: "1".to_string()
                },
                BatchOp::Put {
                    key: "b".to_string(),
                    value: "two words".to_string()
                },
                BatchOp::Delete {
                    key: "a".to_string()
                },
            ]
        );
    }

    #[test]
    fn rejects_malformed_lines() {
        let err = parse_batch("put a 1\nput b\n").expect_err("missing value");
        assert!(err.to_string().contains("line 2"), "{err}");
        assert!(parse_batch("del\n").is_err());
        assert!(parse_batch("del a b\n").is_err());
        assert!(parse_batch("get a\n").is_err());
    }

    #[test]
    fn empty_input_is_an_empty_batch() {
        assert!(parse_batch("").expect("parse").is_empty());
    }
}
