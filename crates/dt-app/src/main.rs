use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use dt_app::backend::{HttpBackend, TwinBackend};
use dt_app::config::AppConfig;
use dt_app::dashboard::{JobList, JobListView, ShareTarget};
use dt_app::generator::Generator;
use dt_app::media::MediaBlob;
use dt_app::probe::{FfprobeProbe, inspect_media};
use dt_app::store::{JobStore, SupabaseClient};
use dt_app::{Wizard, WizardSettings};
use dt_core::{MediaKind, WizardStep, format_duration};

#[derive(Parser)]
#[command(name = "dt-app", version, about = "Create and manage digital twins")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Video,
    Audio,
}

impl From<KindArg> for MediaKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Video => MediaKind::Video,
            KindArg::Audio => MediaKind::Audio,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run the creation wizard end to end
    Create {
        #[arg(long)]
        video: PathBuf,
        #[arg(long)]
        audio: PathBuf,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Text the twin should speak
        #[arg(long)]
        text: Option<String>,
        /// Persist the animated video to cloud storage
        #[arg(long)]
        save: bool,
        /// Record the finished twin as a job
        #[arg(long)]
        record: bool,
    },
    /// Check a media file against the upload limits
    Validate {
        #[arg(long, value_enum)]
        kind: KindArg,
        path: PathBuf,
    },
    /// List recorded jobs, newest first
    Jobs,
    /// Animate an avatar image with a script in one request
    Generate {
        #[arg(long)]
        avatar: PathBuf,
        #[arg(long)]
        script: String,
        #[arg(long)]
        dry_run: bool,
    },
    /// Generate a video from a prompt in one request
    Prompt {
        prompt: String,
        #[arg(long)]
        dry_run: bool,
    },
    /// Check Supabase credentials
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "DT_PASSWORD")]
        password: String,
    },
    /// Show the wizard steps
    Steps,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    match cli.command {
        Command::Create {
            video,
            audio,
            name,
            description,
            text,
            save,
            record,
        } => {
            let store = if record { Some(supabase(&config)?) } else { None };
            create(&config, &video, &audio, name, description, text, save, store).await
        }
        Command::Validate { kind, path } => {
            let upload = inspect_media(kind.into(), &path, &FfprobeProbe::default()).await?;
            match upload.error() {
                None => println!(
                    "{} is valid ({})",
                    path.display(),
                    format_duration(upload.duration_secs().unwrap_or_default())
                ),
                Some(e) => println!("{} is invalid: {}", path.display(), e),
            }
            Ok(())
        }
        Command::Jobs => {
            let list = JobList::new(supabase(&config)?);
            match list.load().await {
                JobListView::Loaded(jobs) => {
                    for job in jobs {
                        println!("{}  {:<7} {}  {}", job.created_at.to_rfc3339(), job.model, job.id, job.video_url);
                        println!("    {}", job.share_title());
                    }
                    let targets: Vec<_> = ShareTarget::all()
                        .into_iter()
                        .map(|t| format!("{}{}", t.name(), if t.is_available() { "" } else { " (soon)" }))
                        .collect();
                    println!("Share to: {}", targets.join(", "));
                }
                JobListView::Failed(message) => eprintln!("{}", message),
            }
            Ok(())
        }
        Command::Generate { avatar, script, dry_run } => {
            let resp = Generator::new(backend(&config)?).from_script(&avatar, &script, dry_run).await?;
            println!("job {}: {}", resp.job_id, resp.video_url);
            Ok(())
        }
        Command::Prompt { prompt, dry_run } => {
            let resp = Generator::new(backend(&config)?).from_prompt(&prompt, dry_run).await?;
            println!("job {}: {}", resp.job_id, resp.video_url);
            println!("script: {}", resp.script);
            println!("avatar: {}", resp.image_url);
            Ok(())
        }
        Command::Login { email, password } => {
            let conf = config.supabase.clone().context("SUPABASE_URL/SUPABASE_KEY not set")?;
            let client = SupabaseClient::new(conf, config.request_timeout)?;
            let session = client.sign_in_with_password(&email, &password).await?;
            println!("Signed in as {} (token valid for {}s)", session.user.id, session.expires_in);
            Ok(())
        }
        Command::Steps => {
            for step in WizardStep::all() {
                println!("{}. {} - {}", step.number(), step.title(), step.description());
                println!("   {}", step.subtitle());
            }
            Ok(())
        }
    }
}

fn backend(config: &AppConfig) -> anyhow::Result<Arc<dyn TwinBackend>> {
    Ok(Arc::new(HttpBackend::new(config.api_url.clone(), config.request_timeout)?))
}

fn supabase(config: &AppConfig) -> anyhow::Result<Arc<dyn JobStore>> {
    let conf = config.supabase.clone().context("SUPABASE_URL/SUPABASE_KEY not set")?;
    Ok(Arc::new(SupabaseClient::new(conf, config.request_timeout)?))
}

#[allow(clippy::too_many_arguments)]
async fn create(
    config: &AppConfig,
    video: &Path,
    audio: &Path,
    name: String,
    description: String,
    text: Option<String>,
    save: bool,
    store: Option<Arc<dyn JobStore>>,
) -> anyhow::Result<()> {
    let settings = WizardSettings {
        poll_interval: config.poll_interval,
        ..Default::default()
    };
    let wizard = Wizard::new(backend(config)?, Arc::new(FfprobeProbe::default()), settings);

    let closer = wizard.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            closer.close();
        }
    });

    let (video_sel, audio_sel) = futures::join!(wizard.select_video(video), wizard.select_audio(audio));
    let (video_sel, audio_sel) = (video_sel?, audio_sel?);
    for upload in [&video_sel.upload, &audio_sel.upload] {
        if let Some(e) = upload.error() {
            bail!("{}: {}", upload.path.display(), e);
        }
    }

    wizard.next().await;
    wizard.next().await;
    wizard.set_name(name).await;
    wizard.set_description(description).await;
    if !wizard.next().await {
        bail!("Give your digital twin a name");
    }

    for handle in [video_sel.pipeline, audio_sel.pipeline].into_iter().flatten() {
        handle.await?;
    }
    let state = wizard.snapshot().await;
    if let Some(e) = state.avatar.error().or(state.frame.error()) {
        bail!("Avatar pipeline failed: {}", e);
    }
    if let Some(e) = state.voice.error() {
        bail!("Voice cloning failed: {}", e);
    }

    if let Some(text) = text {
        wizard.set_speech_text(text).await;
    }
    let speech = wizard.generate_speech().await?;
    let video_url = wizard.animate().await?;
    println!("Animated video: {}", video_url);

    if save {
        let url = wizard.save_to_cloud().await?;
        println!("Saved to cloud: {}", url);
    }

    let state = wizard.snapshot().await;
    let out_dir = config.output_dir.join(state.session_id.to_string());
    tokio::fs::create_dir_all(&out_dir).await?;
    if let Some(avatar) = state.avatar.artifact() {
        write_blob(&out_dir, "avatar", avatar).await?;
    }
    write_blob(&out_dir, "speech", &speech).await?;

    let summary = wizard.finish(store.as_deref()).await?;
    info!(session = %summary.session_id, "Twin created");
    println!("{} is ready", summary.name);
    if let Some(job) = summary.job {
        println!("Recorded job {}", job.id);
    }
    Ok(())
}

async fn write_blob(dir: &Path, stem: &str, blob: &MediaBlob) -> anyhow::Result<()> {
    let path = dir.join(format!("{}.{}", stem, blob.extension()));
    tokio::fs::write(&path, blob.data.as_slice()).await?;
    println!("Wrote {}", path.display());
    Ok(())
}
