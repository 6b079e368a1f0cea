use std::borrow::Cow;
use std::io::{self, Write};
use std::path::Path;

use crate::utils::{format_file_size, format_gib};
use crate::{MediaFile, RunStatistics};

/// Quote a word for a POSIX shell
pub fn shell_quote(word: &str) -> Cow<'_, str> {
    let safe = |c: char| c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c);
    if !word.is_empty() && word.chars().all(safe) {
        Cow::Borrowed(word)
    } else {
        Cow::Owned(format!("'{}'", word.replace('\'', r#"'"'"'"#)))
    }
}

fn quote_path(path: &Path) -> String {
    shell_quote(&path.to_string_lossy()).into_owned()
}

/// Shell lines that replace duplicates with hardlinks to the kept copy.
///
/// Each pair contributes one contiguous block. Blocks appear in the order
/// pairs were resolved, which is not the input order.
#[derive(Debug, Clone, Default)]
pub struct OperationScript {
    lines: Vec<String>,
}

impl OperationScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `discarded` by a hardlink to `kept`, under `discarded`'s own name
    pub fn push_link(&mut self, kept: &MediaFile, discarded: &MediaFile, random_tie_break: bool) {
        if random_tie_break {
            self.lines
                .push("# tie: equivalent quality, kept copy chosen at random".to_string());
        }
        // Paths stay out of comments: a newline in a file name would end the comment
        self.lines.push(format!(
            "# saves {} ({} bytes)",
            format_file_size(discarded.size),
            discarded.size
        ));
        self.lines.push(format!("rm -f {}", quote_path(&discarded.path)));
        self.lines.push(format!(
            "ln -f {} {}",
            quote_path(&kept.path),
            quote_path(&discarded.path)
        ));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Write the complete script: header, pair blocks, then a summary trailer
    pub fn write_to<W: Write>(&self, out: &mut W, stats: &RunStatistics) -> io::Result<()> {
        writeln!(out, "#!/bin/sh")?;
        writeln!(out, "# media-dedup: replace duplicate media with hardlinks")?;
        writeln!(out, "# safe to re-run; review before executing")?;
        for line in &self.lines {
            writeln!(out, "{}", line)?;
        }
        writeln!(out, "#")?;
        writeln!(
            out,
            "# already linked: {} files, {}",
            stats.files_already_linked,
            format_gib(stats.already_saved_bytes)
        )?;
        writeln!(
            out,
            "# to link: {} files, {}",
            stats.files_to_link,
            format_gib(stats.projected_savings_bytes)
        )?;
        out.flush()
    }
}
