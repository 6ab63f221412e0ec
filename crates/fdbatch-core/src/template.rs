//! Control-file template for the fitting tool.
//!
//! A template holds every directive of a job's control file except the
//! dataset to load and the file to save to. Those two are left as `{}` slots
//! and filled per job with [`ConfigTemplate::render`].

use std::fmt::Write as _;

use crate::constants::{RESPONSE_TOKEN, TIME_TOKEN};
use crate::run_config::RunConfig;

const SLOT: &str = "{}";

/// Rendered control-file template with a load slot and a save slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigTemplate {
    text: String,
    load_at: usize,
    save_at: usize,
}

impl ConfigTemplate {
    /// Build the template for a run configuration.
    ///
    /// # Example
    /// ```
    /// # use std::path::PathBuf;
    /// use fdbatch_core::run_config::{Executables, Method, ParameterSpec, RunConfig, SaveOptions};
    /// use fdbatch_core::template::ConfigTemplate;
    ///
    /// let cfg = RunConfig {
    ///     method: Method::Ml,
    ///     precision: 3.0,
    ///     parameters: vec![ParameterSpec { name: "d".into(), value: 0.0, fixed: true, depends_on: vec![] }],
    ///     columns: vec!["rt".into(), "resp".into()],
    ///     response_column: Some(1),
    ///     time_column: Some(0),
    ///     jobs: 1,
    ///     datasets: vec![],
    ///     output_dir: PathBuf::new(),
    ///     session_name: String::new(),
    ///     executables: Executables { fit: PathBuf::new(), predict_cdf: None, construct_samples: None },
    ///     save: SaveOptions::default(),
    /// };
    /// let template = ConfigTemplate::build(&cfg);
    /// assert_eq!(
    ///     template.render("in.dat", "out.dat"),
    ///     "method ml\nprecision 3.0\nset d 0.0\nformat TIME RESPONSE\nload \"in.dat\"\nsave \"out.dat\"\n"
    /// );
    /// ```
    #[must_use]
    pub fn build(config: &RunConfig) -> Self {
        let mut text = String::new();
        let _ = writeln!(text, "method {}", config.method);
        let _ = writeln!(text, "precision {:?}", config.precision);

        for param in config.parameters.iter().filter(|p| p.fixed) {
            let _ = writeln!(text, "set {} {:?}", param.name, param.value);
        }

        for param in config.parameters.iter().filter(|p| !p.depends_on.is_empty()) {
            let _ = writeln!(text, "depends {} {}", param.name, param.depends_on.join(" "));
        }

        text.push_str("format");
        for (idx, column) in config.columns.iter().enumerate() {
            text.push(' ');
            if Some(idx) == config.response_column {
                text.push_str(RESPONSE_TOKEN);
            } else if Some(idx) == config.time_column {
                text.push_str(TIME_TOKEN);
            } else if column == RESPONSE_TOKEN || column == TIME_TOKEN {
                // Another column holds the role; keep this one under a new name.
                let _ = write!(text, "{column}_old");
            } else {
                text.push_str(column);
            }
        }
        text.push('\n');

        text.push_str("load \"");
        let load_at = text.len();
        text.push_str(SLOT);
        text.push_str("\"\nsave \"");
        let save_at = text.len();
        text.push_str(SLOT);
        text.push_str("\"\n");

        Self {
            text,
            load_at,
            save_at,
        }
    }

    /// Raw template text with both `{}` slots in place.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Fill the load and save slots.
    #[must_use]
    pub fn render(&self, load: &str, save: &str) -> String {
        let mut out = String::with_capacity(self.text.len() + load.len() + save.len());
        out.push_str(&self.text[..self.load_at]);
        out.push_str(load);
        out.push_str(&self.text[self.load_at + SLOT.len()..self.save_at]);
        out.push_str(save);
        out.push_str(&self.text[self.save_at + SLOT.len()..]);
        out
    }
}
