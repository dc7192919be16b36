//! Diagnostic sink: the core never prints, but gives a caller-pluggable
//! place to observe what it's doing, in the shape of the teacher's
//! `gui/log.rs` (a tagged-entry sink plus a `Display` dump) minus the
//! rendering half, which belongs to a host UI, not this crate.

use core::fmt;

/// Severity of a single diagnostic entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
	Info,
	Warning,
	Error,
}

/// Anything that wants to observe edit-wire activity. The core never holds
/// one itself; callers wire it in where useful (e.g. around a batch of
/// `editing::handlers` calls) and decide what, if anything, to log.
pub trait DiagnosticSink {
	fn push(&mut self, severity: Severity, message: &str);
}

/// A `Vec`-backed sink, the kind test code and small tools reach for
/// instead of implementing the trait themselves.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
	entries: Vec<(Severity, Box<str>)>,
}

impl RecordingSink {
	const MAX_ENTRIES: usize = 1024;

	pub fn new() -> Self {
		Self::default()
	}

	pub fn entries(&self) -> &[(Severity, Box<str>)] {
		&self.entries
	}
}

impl DiagnosticSink for RecordingSink {
	fn push(&mut self, severity: Severity, message: &str) {
		if self.entries.len() >= Self::MAX_ENTRIES {
			self.entries.remove(0);
		}
		self.entries.push((severity, message.into()));
	}
}

impl fmt::Display for RecordingSink {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (severity, message) in &self.entries {
			let tag = match severity {
				Severity::Info => "[info]    ",
				Severity::Warning => "[warning] ",
				Severity::Error => "[error]   ",
			};
			writeln!(f, "{tag}{message}")?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn records_and_displays_entries() {
		let mut sink = RecordingSink::new();
		sink.push(Severity::Warning, "wire 3 discarded on collision");
		assert_eq!(sink.entries().len(), 1);
		assert_eq!(format!("{sink}"), "[warning] wire 3 discarded on collision\n");
	}
}
