use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::Parser as ClapParser;
use kstring::KString;
use tracing_subscriber::EnvFilter;

use pagebind::config::Config;
use pagebind::io_util::write_output;
use pagebind::page::Page;
use pagebind::server::{Site, serve};


#[derive(clap::Parser, Debug)]
/// Fill a static HTML page template from a JSON content document.
struct Args {
    /// The page template (default from PAGEBIND_TEMPLATE, else
    /// "index.html")
    #[clap(long)]
    template: Option<PathBuf>,

    /// Path or http(s) URL of the content document, relative paths
    /// are taken from the template's directory (default from
    /// PAGEBIND_CONTENT, else "content.json")
    #[clap(long)]
    content: Option<String>,

    /// The message shown when the contact form is submitted
    #[clap(long)]
    form_message: Option<String>,

    /// Give up fetching the content after this many seconds
    #[clap(long)]
    fetch_timeout: Option<u64>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Render the page once
    Render {
        /// Where to write the page (default: stdout)
        #[clap(long)]
        out: Option<PathBuf>,
    },
    /// Serve the page, rendered anew for every request
    Serve {
        /// Address to listen on (default from PAGEBIND_LISTEN, else
        /// "127.0.0.1:3000")
        #[clap(long)]
        listen: Option<String>,

        /// Directory to serve other files from
        #[clap(long)]
        static_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env()
                         .unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = Config::from_env()?;
    if let Some(template) = args.template {
        config.template = template;
    }
    if let Some(content) = args.content {
        config.content = content;
    }
    if let Some(message) = args.form_message {
        config.form_message = KString::from_string(message);
    }
    if let Some(secs) = args.fetch_timeout {
        config.fetch_timeout = Some(Duration::from_secs(secs));
    }

    match args.command {
        Command::Render { out } => {
            let page = Page::open(&config)?;
            write_output(out.as_ref(), &page.render_html())
        }
        Command::Serve { listen, static_dir } => {
            if let Some(listen) = listen {
                config.listen = listen;
            }
            if static_dir.is_some() {
                config.static_dir = static_dir;
            }
            let page = Page::open(&config)?;
            serve(Site { page, static_dir: config.static_dir.clone() }, &config.listen)
        }
    }
}
