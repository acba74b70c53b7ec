use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

/// Open a log file as a sequence of lines, without trailing newlines.
///
/// Read failures are yielded as items rather than swallowed, so a truncated read can be told apart
/// from the end of the file.
pub fn read_lines(path: impl AsRef<Path>) -> io::Result<impl Iterator<Item = io::Result<String>>> {
    Ok(BufReader::new(File::open(path.as_ref())?).lines())
}

/// Count the lines in a file. This is an extra pass over the file, only needed for progress
/// percentages.
pub fn count_lines(path: impl AsRef<Path>) -> io::Result<u64> {
    let mut reader = BufReader::new(File::open(path.as_ref())?);
    let mut count = 0;
    let mut buf = Vec::new();
    while reader.read_until(b'\n', &mut buf)? > 0 {
        count += 1;
        buf.clear();
    }
    Ok(count)
}

/// Lines of in-memory text, in the same shape [`read_lines`] produces.
pub fn str_lines(text: &str) -> impl Iterator<Item = io::Result<String>> + '_ {
    text.lines().map(|line| Ok(line.to_owned()))
}
