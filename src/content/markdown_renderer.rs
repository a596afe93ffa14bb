use std::io;
use std::io::ErrorKind;

use markdown::{CompileOptions, Options, ParseOptions};

pub struct MarkdownRenderer {}

impl MarkdownRenderer {
    /// GFM to HTML. Raw HTML is kept since posts embed `<img>` and `<figure>` tags.
    pub fn render(md_text: &str) -> io::Result<String> {
        if md_text.trim().is_empty() {
            return Ok(String::new());
        }

        match markdown::to_html_with_options(md_text, &Self::options()) {
            Ok(x) => Ok(x),
            Err(e) => Err(io::Error::new(ErrorKind::InvalidInput, e.reason.as_str())),
        }
    }

    fn options() -> Options {
        Options {
            parse: ParseOptions::gfm(),
            compile: CompileOptions {
                allow_dangerous_html: true,
                ..CompileOptions::gfm()
            },
        }
    }
}
