use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "math-cli")]
#[command(about = "Client for the math-api service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Bearer token from `math-cli login`
    #[arg(short, long, env = "MATH_API_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Exchange credentials for a token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Multiply two numbers
    Multiply { a: f64, b: f64 },
    /// Divide a by b
    Divide { a: f64, b: f64 },
    /// Exact factorial of n
    Factorial {
        #[arg(allow_hyphen_values = true)]
        n: i64,
    },
    /// Print the Prometheus metrics snapshot
    Metrics,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
    }

    let (path, body) = match cli.command {
        Commands::Login { username, password } => (
            "login",
            json!({ "username": username, "password": password }),
        ),
        Commands::Multiply { a, b } => ("multiply", json!({ "A": a, "B": b })),
        Commands::Divide { a, b } => ("divide", json!({ "A": a, "B": b })),
        Commands::Factorial { n } => ("factorial", json!({ "N": n })),
        Commands::Metrics => {
            let res = client.get(format!("{}/metrics", cli.url)).send().await?;
            print!("{}", res.text().await?);
            return Ok(());
        }
    };

    let res = client
        .post(format!("{}/{}", cli.url, path))
        .headers(headers)
        .json(&body)
        .send()
        .await?;
    print_response(res).await?;

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
