use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use sporlist::{cli, config, error, logging};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Forget stored Spotify tokens
    Logout,

    /// Show the authorized Spotify user
    Me,

    /// List your playlists
    Playlists,

    /// List the items of a playlist
    Tracks(TracksOptions),

    /// Search public playlists
    Search(SearchOptions),

    #[clap(about = "Create a playlist from the items of other playlists")]
    Create(CreateOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct TracksOptions {
    /// Spotify playlist ID
    pub playlist_id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// Search query
    pub query: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CreateOptions {
    /// Name of the new playlist
    #[clap(long)]
    pub name: String,

    /// Description of the new playlist
    #[clap(long)]
    pub description: Option<String>,

    /// Make the playlist public
    #[clap(long, conflicts_with = "collaborative")]
    pub public: bool,

    /// Allow others to edit the playlist (collaborative playlists are private)
    #[clap(long)]
    pub collaborative: bool,

    /// Playlist ID to copy items from; can be repeated
    #[clap(long = "from", num_args = 1)]
    pub sources: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    logging::init();

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => cli::auth().await,
        Command::Logout => cli::logout().await,
        Command::Me => cli::me().await,
        Command::Playlists => cli::playlists().await,
        Command::Tracks(opt) => cli::tracks(opt.playlist_id).await,
        Command::Search(opt) => cli::search(opt.query).await,
        Command::Create(opt) => {
            cli::create(
                opt.name,
                opt.description,
                opt.public,
                opt.collaborative,
                opt.sources,
            )
            .await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
