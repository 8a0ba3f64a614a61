use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use training_apply::config::AppConfig;
use training_apply::error::AppError;
use training_apply::telemetry;
use training_apply::workflows::training::{
    ApplicationForm, ApplicationFormValues, ApplicationSubmitter, HttpApplicationGateway,
    NavigationRequest, Navigator, PaymentMethod, SubmitOutcome, TrainingSession, UploadedFile,
};
use tracing::info;
use url::Url;

#[derive(Parser, Debug)]
#[command(
    name = "training-apply",
    about = "Validate and submit student training applications from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a form file against the application form rules
    Validate(FormArgs),
    /// Submit an application to the training backend
    Submit(SubmitArgs),
}

#[derive(Args, Debug)]
struct FormArgs {
    /// JSON file holding the form values (email, first_name, ...)
    #[arg(long)]
    form: PathBuf,
}

#[derive(Args, Debug)]
struct SubmitArgs {
    #[command(flatten)]
    form: FormArgs,
    /// Training session to apply for
    #[arg(long)]
    session_id: String,
    /// Training title shown on the success page
    #[arg(long)]
    training_title: Option<String>,
    /// Payment method used when the form leaves it blank (ONLINE or TRANSFER)
    #[arg(long, value_parser = parse_payment_method)]
    payment_method: Option<PaymentMethod>,
    /// Uploaded file as TYPE=URL, e.g. BANK_TRANSFER_RECEIPT=https://cdn/receipt.pdf
    #[arg(long = "attachment", value_parser = parse_attachment)]
    attachments: Vec<AttachmentArg>,
    /// Override TRAINING_API_BASE_URL
    #[arg(long)]
    api_base_url: Option<String>,
    /// Print the JSON payload instead of sending it
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttachmentArg {
    kind: String,
    file: UploadedFile,
}

fn parse_payment_method(raw: &str) -> Result<PaymentMethod, String> {
    PaymentMethod::from_code(raw).ok_or_else(|| format!("'{raw}' is not ONLINE or TRANSFER"))
}

/// `TYPE=URL`; the file name is the last path segment of the URL.
fn parse_attachment(raw: &str) -> Result<AttachmentArg, String> {
    let (kind, location) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected TYPE=URL, got '{raw}'"))?;

    let kind = kind.trim();
    if kind.is_empty() {
        return Err(format!("missing attachment type in '{raw}'"));
    }

    let url = Url::parse(location.trim())
        .map_err(|err| format!("invalid attachment URL '{location}' ({err})"))?;
    let name = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .unwrap_or(kind)
        .to_string();

    Ok(AttachmentArg {
        kind: kind.to_string(),
        file: UploadedFile::new(url.as_str(), name),
    })
}

/// Prints the redirect target instead of routing a browser.
struct StdoutNavigator {
    origin: Url,
}

impl Navigator for StdoutNavigator {
    fn navigate(&self, request: NavigationRequest) {
        match request.to_url(&self.origin) {
            Ok(url) => println!("Redirect: {url}"),
            Err(_) => println!("Redirect: {}", request.path),
        }
    }
}

fn read_form(path: &Path) -> Result<ApplicationForm, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let values: ApplicationFormValues =
        serde_json::from_str(&raw).map_err(|source| AppError::Input {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(ApplicationForm::from_values(values))
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;

    if let Command::Submit(SubmitArgs {
        api_base_url: Some(base_url),
        ..
    }) = &cli.command
    {
        config.api.override_base_url(base_url)?;
    }

    telemetry::init(&config.telemetry)?;
    info!(environment = ?config.environment, api = %config.api.base_url, "training-apply starting");

    match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Submit(args) => run_submit(args, &config).await,
    }
}

fn run_validate(args: FormArgs) -> Result<(), AppError> {
    let form = read_form(&args.form)?;
    let errors = form.errors();

    if errors.is_empty() {
        println!("Form is valid");
    } else {
        println!("Form has {} error(s)", errors.len());
        for error in errors {
            println!("- {}: {}", error.field(), error);
        }
    }

    Ok(())
}

async fn run_submit(args: SubmitArgs, config: &AppConfig) -> Result<(), AppError> {
    let SubmitArgs {
        form,
        session_id,
        training_title,
        payment_method,
        attachments,
        dry_run,
        ..
    } = args;

    let gateway = Arc::new(HttpApplicationGateway::new(&config.api)?);
    let navigator = Arc::new(StdoutNavigator {
        origin: config.frontend.base_url.clone(),
    });
    let submitter = ApplicationSubmitter::new(gateway.clone(), navigator, read_form(&form.form)?);

    let session = match training_title {
        Some(title) => TrainingSession::new(session_id).with_title(title),
        None => TrainingSession::new(session_id),
    };
    submitter.select_session(Some(session));
    submitter.set_payment_method(payment_method.map(|method| method.code().to_string()));
    for attachment in attachments {
        submitter.register_upload(attachment.kind, attachment.file);
    }

    if dry_run {
        let body = serde_json::to_string_pretty(&submitter.preview_payload())
            .map_err(AppError::Output)?;
        println!("POST {}", gateway.endpoint());
        println!("{body}");
        return Ok(());
    }

    match submitter.submit().await {
        SubmitOutcome::Redirected(request) => {
            println!(
                "Application {} received (status {})",
                request.param("applicationNumber").unwrap_or_default(),
                request.param("status").unwrap_or_default()
            );
        }
        SubmitOutcome::Invalid { .. } => {
            println!("Application not sent");
            if let Some(message) = submitter.submit_error() {
                println!("- {message}");
            }
            for error in submitter.form().visible_errors() {
                println!("- {}: {}", error.field(), error);
            }
        }
        SubmitOutcome::Failed { message } => println!("Submission failed: {message}"),
        SubmitOutcome::AlreadySubmitting => println!("A submission is already in progress"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn attachment_name_comes_from_url_path() {
        let parsed = parse_attachment("BANK_TRANSFER_RECEIPT=https://cdn.example.sn/up/recu.pdf")
            .expect("valid attachment");
        assert_eq!(parsed.kind, "BANK_TRANSFER_RECEIPT");
        assert_eq!(parsed.file.url, "https://cdn.example.sn/up/recu.pdf");
        assert_eq!(parsed.file.name, "recu.pdf");
    }

    #[test]
    fn attachment_without_file_segment_is_named_after_type() {
        let parsed =
            parse_attachment("ID_CARD=https://cdn.example.sn/").expect("valid attachment");
        assert_eq!(parsed.file.name, "ID_CARD");
    }

    #[test]
    fn malformed_attachments_are_rejected() {
        assert!(parse_attachment("https://cdn.example.sn/recu.pdf").is_err());
        assert!(parse_attachment("=https://cdn.example.sn/recu.pdf").is_err());
        assert!(parse_attachment("ID_CARD=not a url").is_err());
    }

    #[test]
    fn submit_arguments_parse() {
        let cli = Cli::try_parse_from([
            "training-apply",
            "submit",
            "--form",
            "form.json",
            "--session-id",
            "session-42",
            "--payment-method",
            "transfer",
            "--attachment",
            "BANK_TRANSFER_RECEIPT=https://cdn.example.sn/recu.pdf",
            "--dry-run",
        ])
        .expect("arguments parse");

        match cli.command {
            Command::Submit(args) => {
                assert_eq!(args.session_id, "session-42");
                assert_eq!(args.payment_method, Some(PaymentMethod::Transfer));
                assert_eq!(args.attachments.len(), 1);
                assert!(args.dry_run);
            }
            other => panic!("expected submit command, got {other:?}"),
        }
    }
}
