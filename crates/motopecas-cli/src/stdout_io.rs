use std::io::{self, Write};

/// Writes `text` and a trailing newline to stdout. A closed pipe
/// (`motopecas transaction list | head`) is not an error.
pub fn write_stdout_line(text: &str) -> io::Result<()> {
    write_line(&mut io::stdout().lock(), text)
}

fn write_line(writer: &mut impl Write, text: &str) -> io::Result<()> {
    let written = writer
        .write_all(text.as_bytes())
        .and_then(|()| writer.write_all(b"\n"))
        .and_then(|()| writer.flush());
    match written {
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}
