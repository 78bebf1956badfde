use std::sync::Arc;

use minijinja::{Environment, Error};

/// Compiled page templates. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Views {
    pub env: Arc<Environment<'static>>,
}

impl Views {
    pub fn new() -> Result<Self, Error> {
        let mut env = Environment::new();
        env.add_template("notes.html", include_str!("templates/notes.html"))?;

        Ok(Self { env: Arc::new(env) })
    }

    /// Renders `key`, or a single block of it when written as `template#block`.
    pub fn render<D: serde::Serialize>(&self, key: &str, data: D) -> Result<String, Error> {
        if let Some((template_name, block_name)) = key.split_once('#') {
            let template = self.env.get_template(template_name)?;
            return template.eval_to_state(&data)?.render_block(block_name);
        }

        let template = self.env.get_template(key)?;
        template.render(&data)
    }
}
