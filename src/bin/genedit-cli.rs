use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};

use genedit::drawing::{CanvasEvent, DisplayMapping, DrawingSession, ImageSource, Tool, ToolSettings};

#[derive(Parser)]
#[command(name = "genedit-cli")]
#[command(about = "Client for the genedit gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Single,
    Multi,
    Photoshop,
    Timetravel,
}

impl Mode {
    fn as_str(self) -> &'static str {
        match self {
            Mode::Single => "single",
            Mode::Multi => "multi",
            Mode::Photoshop => "photoshop",
            Mode::Timetravel => "timetravel",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show gateway health
    Health,
    /// Edit one or more images with a prompt
    Edit {
        #[arg(long = "image", required = true)]
        images: Vec<String>,
        #[arg(long)]
        prompt: String,
        #[arg(long, value_enum, default_value = "single")]
        mode: Mode,
        /// Mask image URL (photoshop mode)
        #[arg(long)]
        mask: Option<String>,
    },
    /// Animate an image into a short video
    Video {
        #[arg(long)]
        image: String,
        #[arg(long)]
        prompt: String,
    },
    /// Generate stage prompts only
    Prompts {
        #[arg(long)]
        prompt: String,
        #[arg(long, default_value_t = 3)]
        stages: u32,
    },
    /// Generate a multi-stage progression of an image
    Stages {
        #[arg(long)]
        image: String,
        #[arg(long)]
        prompt: String,
        #[arg(long, default_value_t = 3)]
        stages: u32,
    },
    /// Render a mask locally by replaying a JSON array of canvas events
    Mask {
        /// Background image (file path, http(s) URL or data URL)
        #[arg(long)]
        image: String,
        #[arg(long)]
        events: PathBuf,
        #[arg(long, short)]
        output: PathBuf,
        #[arg(long, default_value_t = 512)]
        max_width: u32,
        #[arg(long, default_value_t = 384)]
        max_height: u32,
        #[arg(long, default_value_t = 20.0)]
        brush_size: f32,
        #[arg(long, default_value_t = 0.8)]
        opacity: f32,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/api/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Edit {
            images,
            prompt,
            mode,
            mask,
        } => {
            let body = json!({
                "imageUrls": images,
                "prompt": prompt,
                "mode": mode.as_str(),
                "maskUrl": mask,
            });
            let res = client
                .post(format!("{}/api/edit-image", cli.url))
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Video { image, prompt } => {
            let body = json!({ "imageUrl": image, "prompt": prompt });
            let res = client
                .post(format!("{}/api/generate-video", cli.url))
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Prompts { prompt, stages } => {
            let body = json!({ "userPrompt": prompt, "numStages": stages });
            let res = client
                .post(format!("{}/api/generate-prompts", cli.url))
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Stages {
            image,
            prompt,
            stages,
        } => {
            let body = json!({ "imageUrl": image, "prompt": prompt, "numStages": stages });
            let res = client
                .post(format!("{}/api/time-travel", cli.url))
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Mask {
            image,
            events,
            output,
            max_width,
            max_height,
            brush_size,
            opacity,
        } => {
            let events: Vec<CanvasEvent> = serde_json::from_str(&std::fs::read_to_string(&events)?)?;
            let mut session =
                DrawingSession::load_background(ImageSource::parse(&image), max_width, max_height).await?;
            session.set_settings(ToolSettings::new(Tool::Brush, brush_size, opacity));

            let mask = session.replay(events, &DisplayMapping::default());
            std::fs::write(&output, mask.encode_png()?)?;
            println!(
                "Wrote {}x{} mask ({:.1}% editable) to {}",
                mask.width(),
                mask.height(),
                mask.coverage() * 100.0,
                output.display()
            );
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
