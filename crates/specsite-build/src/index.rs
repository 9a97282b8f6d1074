//! Version listing page.

use handlebars::Handlebars;
use serde::Serialize;

use crate::discovery::SpecDescriptor;
use crate::error::BuildResult;

/// File name of the generated listing page.
pub const INDEX_FILE_NAME: &str = "index.html";

const INDEX_TEMPLATE: &str = include_str!("templates/index.hbs");

#[derive(Serialize)]
struct IndexPage<'a> {
    title: &'a str,
    versions: Vec<IndexRow>,
}

#[derive(Serialize)]
struct IndexRow {
    version: u64,
    href: String,
    latest: bool,
}

/// Renders the index page from an ordered descriptor list.
pub struct IndexGenerator {
    handlebars: Handlebars<'static>,
    title: String,
}

impl IndexGenerator {
    /// Create a generator whose page heading is `title`.
    pub fn new(title: impl Into<String>) -> BuildResult<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars
            .register_template_string("index", INDEX_TEMPLATE)
            .map_err(Box::new)?;

        Ok(Self {
            handlebars,
            title: title.into(),
        })
    }

    /// Render the page. `specs` must already be sorted newest first; the first
    /// entry is marked as the latest release.
    pub fn generate(&self, specs: &[SpecDescriptor]) -> BuildResult<String> {
        let versions = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| IndexRow {
                version: spec.version,
                href: spec.output_file_name(),
                latest: i == 0,
            })
            .collect();

        let page = IndexPage {
            title: &self.title,
            versions,
        };

        Ok(self.handlebars.render("index", &page)?)
    }
}
