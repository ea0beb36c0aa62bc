mod app;
mod input;
mod render;

use anyhow::Result;

fn main() -> Result<()> {
    app::run()
}
