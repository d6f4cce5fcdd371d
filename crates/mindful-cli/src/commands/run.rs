use clap::Args;
use mindful_core::{
    run_session, AmbientSound, Config, DurationPreset, Intent, MeditationSession, SessionConfig,
    SoundGraph, SystemClock, VirtualGraph,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::console::{self, Line};
use crate::render::Renderer;

#[derive(Args)]
pub struct RunArgs {
    /// Duration preset, as a label ("10m") or seconds ("600")
    #[arg(long)]
    duration: Option<String>,
    /// Ambient sound: none, rain, forest, binaural
    #[arg(long)]
    sound: Option<String>,
    /// Minutes between interval chimes (0 = off)
    #[arg(long)]
    chime: Option<u32>,
    /// Start and stop ambient sound instantly instead of the 2 s fade
    #[arg(long)]
    no_fade: bool,
    /// Run without opening the audio device
    #[arg(long)]
    mute: bool,
    /// Print one JSON event per line
    #[arg(long)]
    json: bool,
    /// Start the countdown immediately
    #[arg(long)]
    start: bool,
}

impl RunArgs {
    fn session_config(&self, config: &Config) -> Result<SessionConfig, Box<dyn std::error::Error>> {
        let mut session = config.session_config();
        if let Some(duration) = &self.duration {
            session.duration_secs = DurationPreset::parse(duration)?.secs;
        }
        if let Some(sound) = &self.sound {
            session.sound = sound.parse::<AmbientSound>()?;
        }
        if let Some(chime) = self.chime {
            session.chime_interval_min = chime;
        }
        if self.no_fade {
            session.fade_enabled = false;
        }
        Ok(session)
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let session_config = args.session_config(&config)?;
    let renderer = Renderer::new(args.json, config.display.clone());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = match open_audio(args.mute) {
        Some(graph) => runtime.block_on(console_session(session_config, graph, renderer, args.start)),
        None => runtime.block_on(console_session(
            session_config,
            VirtualGraph::new(),
            renderer,
            args.start,
        )),
    };
    // The stdin reader may still be parked on a blocking read.
    runtime.shutdown_background();
    result
}

#[cfg(feature = "playback")]
fn open_audio(mute: bool) -> Option<mindful_core::RodioGraph> {
    if mute {
        return None;
    }
    match mindful_core::RodioGraph::open() {
        Ok(graph) => Some(graph),
        Err(e) => {
            tracing::warn!(error = %e, "continuing without sound");
            None
        }
    }
}

#[cfg(not(feature = "playback"))]
fn open_audio(_mute: bool) -> Option<VirtualGraph> {
    None
}

async fn console_session<G: SoundGraph>(
    config: SessionConfig,
    graph: G,
    renderer: Renderer,
    start: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = MeditationSession::new(config, graph, SystemClock);
    let (intent_tx, intent_rx) = mpsc::channel(16);
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    if start {
        intent_tx.send(Intent::Start).await?;
    }
    if !renderer.is_json() {
        eprintln!("type 'help' for commands");
    }

    let (session, read, print) = tokio::join!(
        run_session(session, intent_rx, event_tx),
        read_console(intent_tx),
        print_events(event_rx, renderer),
    );
    read?;
    print?;

    tracing::info!(
        practiced_secs = session.history().total_secs(),
        "console session closed"
    );
    Ok(())
}

/// Forward console lines as intents until `quit` or end of input.
async fn read_console(intents: mpsc::Sender<Intent>) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match console::parse_line(&line) {
            Ok(Line::Intent(intent)) => {
                if intents.send(intent).await.is_err() {
                    break;
                }
            }
            Ok(Line::Help) => eprintln!("{}", console::HELP),
            Ok(Line::Quit) => break,
            Err(e) => eprintln!("error: {e}"),
        }
    }
    Ok(())
}

async fn print_events(
    mut events: mpsc::UnboundedReceiver<mindful_core::Event>,
    renderer: Renderer,
) -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    while let Some(event) = events.recv().await {
        if let Some(text) = renderer.render(&event) {
            stdout.write_all(text.as_bytes()).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}
