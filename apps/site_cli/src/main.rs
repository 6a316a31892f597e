use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    form::{
        CONTACT_FORM_SELECTOR, FIELD_EMAIL_ID, FIELD_MESSAGE_ID, FIELD_NAME_ID, FIELD_SUBJECT_ID,
        MESSAGES_SELECTOR,
    },
    load_settings, markup, Dispatch, Site,
};
use dom::{DomEvent, Selector};
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "Drive the contact page widgets from the command line")]
struct Cli {
    /// Overrides the configured submission endpoint.
    #[arg(long, global = true)]
    endpoint: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill the contact form and submit it.
    Submit {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "")]
        message: String,
    },
    /// Click a marquee link and watch the toast until it is dismissed.
    Toast {
        #[arg(long, default_value_t = 0)]
        link: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(endpoint) = cli.endpoint {
        settings.form_endpoint = endpoint;
    }

    let site = Site::activate(markup::demo_page(), &settings)
        .context("failed to activate contact page")?;

    match cli.command {
        Command::Submit {
            name,
            email,
            subject,
            message,
        } => {
            let document = site.document();
            for (id, value) in [
                (FIELD_NAME_ID, name),
                (FIELD_EMAIL_ID, email),
                (FIELD_SUBJECT_ID, subject),
                (FIELD_MESSAGE_ID, message),
            ] {
                let field = document
                    .get_element_by_id(id)
                    .with_context(|| format!("demo page is missing #{id}"))?;
                document.set_value(field, value);
            }

            let form = document
                .query_selector_all(&Selector::parse(CONTACT_FORM_SELECTOR)?)
                .first()
                .copied()
                .context("demo page has no contact form")?;
            let outcome = site.dispatch(&DomEvent::submit(form)).await;

            let feedback = document
                .query_selector(form, &Selector::parse(MESSAGES_SELECTOR)?)
                .map(|messages| document.text_content(messages))
                .unwrap_or_default();
            println!("{feedback}");

            if let Dispatch::Submitted(Err(err)) = outcome {
                bail!("submission failed: {err}");
            }
        }
        Command::Toast { link } => {
            let Some(&target) = site.toast().links().get(link) else {
                bail!(
                    "no marquee link at index {link} ({} available)",
                    site.toast().links().len()
                );
            };
            site.dispatch(&DomEvent::click(target)).await;

            let shown = site.toast().snapshot();
            if !shown.visible {
                println!("link {link} has no toast text");
                return Ok(());
            }
            println!("toast: {}", shown.message);

            tokio::time::sleep(settings.toast_dismiss_delay() + Duration::from_millis(50)).await;
            info!(visible = site.toast().snapshot().visible, "after dismissal delay");
        }
    }

    Ok(())
}
