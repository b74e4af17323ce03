use std::env;
use std::io::{self, BufRead as _, Write};

use anyhow::Context as _;
use console::Term;

#[derive(Debug)]
enum Inner {
    Term(Term),
    Buf {
        input: io::BufReader<io::Cursor<String>>,
        output: Vec<u8>,
    },
    Sink(io::Sink),
}

/// Config for console.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct ConsoleConfig {
    /// If true, assumes yes and skips any confirmation.
    pub assume_yes: bool,
}

#[derive(Debug)]
pub struct Console {
    inner: Inner,
    conf: ConsoleConfig,
}

impl Console {
    pub fn term(conf: ConsoleConfig) -> Self {
        Self {
            inner: Inner::Term(Term::stderr()),
            conf,
        }
    }

    pub fn buf(conf: ConsoleConfig) -> Self {
        Self {
            inner: Inner::Buf {
                input: io::BufReader::new(io::Cursor::new(String::new())),
                output: Vec::new(),
            },
            conf,
        }
    }

    pub fn sink(conf: ConsoleConfig) -> Self {
        Self {
            inner: Inner::Sink(io::sink()),
            conf,
        }
    }

    /// Queues user input for a buffered console.
    pub fn write_input(&mut self, s: &str) {
        if let Inner::Buf { ref mut input, .. } = self.inner {
            input.get_mut().get_mut().push_str(s)
        }
    }

    pub fn take_buf(self) -> Option<Vec<u8>> {
        match self.inner {
            Inner::Buf { output: buf, .. } => Some(buf),
            _ => None,
        }
    }

    pub fn take_output(self) -> crate::Result<String> {
        self.take_buf()
            .context("Could not take buf from console")
            .and_then(|buf| Ok(String::from_utf8(buf)?))
    }

    #[inline]
    fn as_mut_write(&mut self) -> &mut dyn Write {
        match self.inner {
            Inner::Term(ref mut w) => w,
            Inner::Buf {
                output: ref mut w, ..
            } => w,
            Inner::Sink(ref mut w) => w,
        }
    }

    pub fn warn(&mut self, message: &str) -> io::Result<()> {
        writeln!(self, "{}: {}", sty_y("WARN"), message)
    }

    pub fn confirm(&mut self, message: &str, default: bool) -> io::Result<bool> {
        if self.conf.assume_yes {
            return Ok(true);
        }

        let prompt = format!("{} ({}) ", message, if default { "Y/n" } else { "y/N" });
        let input = self.prompt_and_read(&prompt, false)?;
        match input.trim().to_lowercase().as_str() {
            "y" | "yes" => Ok(true),
            "n" | "no" => Ok(false),
            _ => Ok(default),
        }
    }

    /// Asks the user to pick one of `items` by its number and returns its index.
    ///
    /// A single item is picked without asking.
    pub fn select(&mut self, message: &str, items: &[String]) -> io::Result<usize> {
        match items.len() {
            0 => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "Found nothing to select from",
                ))
            }
            1 => {
                writeln!(self, "{} {}", message, items[0])?;
                return Ok(0);
            }
            _ => {}
        }

        writeln!(self, "{}", message)?;
        for (i, item) in items.iter().enumerate() {
            writeln!(self, "{:>3}) {}", i + 1, item)?;
        }
        let prompt = format!("Select [1-{}] ", items.len());
        loop {
            let input = self.prompt_and_read(&prompt, false)?;
            if input.is_empty() {
                // end of input, nobody is going to answer
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "Could not read selection",
                ));
            }
            match input.trim().parse::<usize>() {
                Ok(n) if 1 <= n && n <= items.len() => return Ok(n - 1),
                _ => writeln!(self, "Invalid selection : {}", input.trim())?,
            }
        }
    }

    pub fn get_env_or_prompt_and_read(
        &mut self,
        env_name: &str,
        prompt: &str,
        is_password: bool,
    ) -> io::Result<String> {
        if let Ok(val) = env::var(env_name) {
            writeln!(
                self,
                "{}{:16} (read from env {})",
                prompt,
                if is_password { "********" } else { &val },
                env_name
            )?;
            return Ok(val);
        };
        self.prompt_and_read(prompt, is_password)
    }

    fn read_user(&mut self, is_password: bool) -> io::Result<String> {
        match self.inner {
            Inner::Term(ref term) => {
                if is_password {
                    term.read_secure_line()
                } else {
                    term.read_line()
                }
            }
            Inner::Buf { ref mut input, .. } => {
                let mut buf = String::new();
                input.read_line(&mut buf)?;
                Ok(buf)
            }
            Inner::Sink(_) => Ok(String::from("")),
        }
    }

    fn prompt(&mut self, prompt: &str) -> io::Result<()> {
        write!(self, "{}", prompt)?;
        self.flush()?;
        Ok(())
    }

    fn prompt_and_read(&mut self, prompt: &str, is_password: bool) -> io::Result<String> {
        self.prompt(prompt)?;
        self.read_user(is_password)
    }
}

impl Write for Console {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.as_mut_write().write(buf)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.as_mut_write().flush()
    }
}

macro_rules! def_color {
    ($name:ident, $name_upper:ident, $style:expr) => {
        ::lazy_static::lazy_static! {
            static ref $name_upper: ::console::Style = {
                use ::console::Style;
                $style
            };
        }

        pub fn $name<D>(val: D) -> ::console::StyledObject<D> {
            $name_upper.apply_to(val)
        }
    };
}

pub use color_defs::*;

#[cfg_attr(tarpaulin, ignore)]
mod color_defs {
    def_color!(sty_r, STY_R, Style::new().red());
    def_color!(sty_g, STY_G, Style::new().green());
    def_color!(sty_y, STY_Y, Style::new().yellow());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn() -> anyhow::Result<()> {
        let conf = ConsoleConfig { assume_yes: true };
        let mut cnsl = Console::buf(conf);
        cnsl.warn("message")?;
        let output_str = cnsl.take_output()?;
        assert!(output_str.ends_with(": message\n"));
        assert!(output_str.contains("WARN"));
        Ok(())
    }

    #[test]
    fn test_confirm() -> anyhow::Result<()> {
        let tests = &[
            (true, "", false, true),
            (false, "y\n", false, true),
            (false, "Y", false, true),
            (false, "yes", false, true),
            (false, "Yes\n", false, true),
            (false, "n", true, false),
            (false, "N", true, false),
            (false, "no", true, false),
            (false, "No\n", true, false),
            (false, "hoge", true, true),
            (false, "hoge", false, false),
            (false, "", true, true),
            (false, "", false, false),
        ];
        for (assume_yes, input, default, expected) in tests {
            let conf = ConsoleConfig {
                assume_yes: *assume_yes,
            };
            let mut cnsl = Console::buf(conf);
            cnsl.write_input(input);
            let actual = cnsl.confirm("message", *default).unwrap();
            assert_eq!(actual, *expected);
        }
        Ok(())
    }

    #[test]
    fn test_select() -> anyhow::Result<()> {
        let items = vec!["alpha".to_owned(), "beta".to_owned(), "gamma".to_owned()];
        let tests = &[("2\n", 1), ("3", 2), ("0\n9\nx\n1\n", 0)];
        for (input, expected) in tests {
            let mut cnsl = Console::buf(ConsoleConfig::default());
            cnsl.write_input(input);
            assert_eq!(cnsl.select("Which one", &items)?, *expected);
        }
        Ok(())
    }

    #[test]
    fn test_select_single_and_empty() -> anyhow::Result<()> {
        let mut cnsl = Console::buf(ConsoleConfig::default());
        assert_eq!(cnsl.select("Only", &["alpha".to_owned()])?, 0);
        assert!(cnsl.select("None", &[]).is_err());

        let mut cnsl = Console::buf(ConsoleConfig::default());
        let items = vec!["alpha".to_owned(), "beta".to_owned()];
        assert!(cnsl.select("No answer", &items).is_err());
        Ok(())
    }

    #[test]
    fn test_get_env_or_prompt_and_read() -> anyhow::Result<()> {
        let cnsl_buf_0 = Console::buf(ConsoleConfig::default());
        let mut cnsl_buf_1 = Console::buf(ConsoleConfig::default());
        cnsl_buf_1.write_input("test_input");
        let cnsl_sink_0 = Console::sink(ConsoleConfig::default());
        let cnsl_sink_1 = Console::sink(ConsoleConfig::default());
        let env_name_exists = if cfg!(windows) { "APPDATA" } else { "HOME" };
        let env_val: &str = &env::var(env_name_exists).unwrap();
        let tests = &mut [
            (cnsl_buf_0, env_name_exists, env_val),
            (cnsl_buf_1, "DJSYNC_TEST_UNKNOWN_VAR", "test_input"),
            (cnsl_sink_0, env_name_exists, env_val),
            (cnsl_sink_1, "DJSYNC_TEST_UNKNOWN_VAR", ""),
        ];

        for (ref mut cnsl, env_name, expected) in tests {
            let actual = cnsl.get_env_or_prompt_and_read(env_name, "prompt >", true)?;
            assert_eq!(&actual, expected);
        }
        Ok(())
    }
}
