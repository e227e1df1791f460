use std::{path::Path, fs::{read_to_string, write}};

use anyhow::{Result, anyhow, Context};


pub fn my_read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
    read_to_string(&path).with_context(
        || anyhow!("opening path for reading: {:?}", path.as_ref()))
}

/// Write `contents` to the file at `path`, or to stdout if `path` is
/// `None`.
pub fn write_output<P: AsRef<Path>>(path: Option<P>, contents: &str) -> Result<()> {
    match path {
        Some(path) => write(&path, contents).with_context(
            || anyhow!("writing to path: {:?}", path.as_ref())),
        None => {
            use std::io::Write;
            let mut out = std::io::stdout().lock();
            out.write_all(contents.as_bytes())
                .and_then(|()| out.flush())
                .with_context(|| anyhow!("writing to stdout"))
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_read_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");
        write_output(Some(&path), "<p>x</p>").unwrap();
        assert_eq!(my_read_to_string(&path).unwrap(), "<p>x</p>");
        let e = my_read_to_string(dir.path().join("missing")).unwrap_err();
        assert!(e.to_string().contains("missing"));
    }
}
