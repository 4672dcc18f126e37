use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;

/// Destination for machine-readable output: stdout or a file.
#[derive(Debug)]
pub enum Output {
    Stdout(io::Stdout),
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    /// Writes `value` as pretty JSON to `path`, or to stdout if `path` is `None`.
    pub fn save_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = match path {
            Some(path) => Output::create(path)?,
            None => Output::Stdout(io::stdout()),
        };
        output.write_json(value)
    }

    fn create(path: &Path) -> anyhow::Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path: path.to_owned(),
        })
    }

    fn display_path(&self) -> String {
        match self {
            Output::Stdout(_) => "stdout".to_owned(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let target = self.display_path();
        let writer: &mut dyn io::Write = match self {
            Output::Stdout(stdout) => stdout,
            Output::File { writer, .. } => writer,
        };
        serde_json::to_writer_pretty(&mut *writer, value)
            .with_context(|| format!("Failed to write JSON to {target}"))?;
        writeln!(writer).with_context(|| format!("Failed to write newline to {target}"))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush output to {target}"))?;
        Ok(())
    }
}

/// Reads and parses a JSON file, naming `file_kind` in error messages.
pub fn read_json_file<T>(file_kind: &str, path: &Path) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {file_kind} file: {}", path.display()))
}
