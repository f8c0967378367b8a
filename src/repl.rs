//! Interactive shell: read one line at a time, dispatch it as a single
//! statement against a long-lived `Engine`, print the result or error,
//! and loop.

use std::io::{self, BufRead, Write};

use crate::engine::Engine;
use crate::error::Lang;

/// One REPL session, carrying the language toggle across lines (`--english`
/// sets the initial value; `ANGLICE`/`LATINE` flip it at runtime).
pub struct Repl {
    engine: Engine,
    lang: Lang,
}

impl Repl {
    pub fn new(lang: Lang) -> Self {
        Self { engine: Engine::new(), lang }
    }

    /// Run the loop against arbitrary streams, so this is testable without
    /// a real terminal attached.
    pub fn run<R: BufRead, W: Write, Err: Write>(
        &mut self,
        stdin: &mut R,
        stdout: &mut W,
        stderr: &mut Err,
    ) -> io::Result<()> {
        loop {
            write!(stdout, "latin> ")?;
            stdout.flush()?;

            let mut line = String::new();
            if stdin.read_line(&mut line)? == 0 {
                break;
            }
            let trimmed = line.trim();

            if trimmed.is_empty() {
                continue;
            }
            match trimmed {
                "VALE" | "EXIT" => break,
                "ANGLICE" => {
                    self.lang = Lang::English;
                    continue;
                }
                "LATINE" => {
                    self.lang = Lang::Latin;
                    continue;
                }
                _ => {}
            }

            if let Err(error) = self.engine.execute_repl_line(trimmed, stdin, stdout, stderr) {
                let _ = writeln!(stderr, "{}", error.render(self.lang));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_session(input: &str) -> (String, String) {
        let mut repl = Repl::new(Lang::Latin);
        let mut stdin = Cursor::new(input.as_bytes().to_vec());
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        repl.run(&mut stdin, &mut stdout, &mut stderr).unwrap();
        (String::from_utf8(stdout).unwrap(), String::from_utf8(stderr).unwrap())
    }

    #[test]
    fn test_vale_terminates_session() {
        let (_, stderr) = run_session("SIT NUMERUS\nVALE\n");
        assert!(stderr.is_empty());
    }

    #[test]
    fn test_exit_terminates_session() {
        let (_, stderr) = run_session("SIT NUMERUS\nEXIT\n");
        assert!(stderr.is_empty());
    }

    #[test]
    fn test_eof_without_vale_terminates_cleanly() {
        let (_, stderr) = run_session("SIT NUMERUS\n");
        assert!(stderr.is_empty());
    }

    #[test]
    fn test_anglice_toggles_error_language() {
        let (_, stderr) = run_session("AVDI NUMERUS\nVALE\n");
        assert!(stderr.contains("ERRATUM"));
        let (_, stderr) = run_session("ANGLICE\nAVDI NUMERUS\nVALE\n");
        assert!(stderr.contains("ERROR"));
    }

    #[test]
    fn test_latine_toggles_back() {
        let (_, stderr) = run_session("ANGLICE\nLATINE\nAVDI NUMERUS\nVALE\n");
        assert!(stderr.contains("ERRATUM"));
    }

    #[test]
    fn test_statement_output_prints() {
        let (stdout, _) = run_session("SIT NUMERUS\nNUMERUS EST ADDE II III\nSCRIBE NUMERUS\nVALE\n");
        assert!(stdout.contains("V\n"));
    }
}
