use std::path::Path;

use tokio::{
    fs::File,
    io::{self, AsyncBufReadExt, BufReader, Lines},
};

/// Read a file from the given path into a list of strings
pub async fn read_file(path: impl AsRef<Path>) -> io::Result<Vec<String>> {
    let mut r = line_reader(path).await?;
    let mut lines = Vec::new();

    while let Some(line) = r.next_line().await? {
        lines.push(line);
    }

    Ok(lines)
}

/// Open a file for line-by-line reading, for inputs too large to hold in memory
pub async fn line_reader(path: impl AsRef<Path>) -> io::Result<Lines<BufReader<File>>> {
    let f = File::open(path).await?;

    Ok(BufReader::new(f).lines())
}
