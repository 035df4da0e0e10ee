use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use acmp::e2e::identity_store::MemoryIdentityStore;
use acmp::e2e::manager::LocalEncryptor;
use acmp::e2e::IdentityKeypair;
use acmp::error::{AcmpError, Result};
use acmp::interfaces::signer::Signer;
use acmp::providers::{LocalSigner, MemoryKeyDirectory, MemoryLedger};
use acmp::{
    AccountAddress, Attachment, Collaborators, Config, Message, MessagingClient, PublicKey,
    RawMessage, SimpleMessage,
};

const DEMO_CONTRACT: &str = "0xacc0";

#[derive(Parser, Debug)]
#[command(name = "acmp")]
#[command(about = "Encrypted ledger mailbox messaging")]
struct Cli {
    #[arg(long, env = "ACMP_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Encode a SimpleMessage and print its bytes as hex.
    Encode {
        #[arg(long)]
        text: String,

        #[arg(long = "attachment", value_name = "TYPE=DATA")]
        attachments: Vec<String>,
    },
    /// Decode hex message bytes.
    Decode { hex: String },
    /// Generate a signing key and an encryption identity.
    Keygen,
    /// Exchange one message between two in-memory accounts.
    Demo {
        #[arg(long, default_value = "hello man!!")]
        text: String,

        #[arg(long = "attachment", value_name = "TYPE=DATA")]
        attachments: Vec<String>,
    },
}

fn parse_attachment(value: &str) -> Result<Attachment> {
    let (attachment_type, data) = value
        .split_once('=')
        .ok_or_else(|| AcmpError::Config(format!("attachment must be TYPE=DATA: {value}")))?;
    Ok(Attachment::new(attachment_type, data.as_bytes().to_vec()))
}

fn build_message(text: String, attachments: &[String]) -> Result<SimpleMessage> {
    let attachments = attachments
        .iter()
        .map(String::as_str)
        .map(parse_attachment)
        .collect::<Result<Vec<_>>>()?;
    Ok(SimpleMessage::new(text, attachments))
}

fn print_message(raw: &RawMessage) -> Result<()> {
    println!(
        "header: version={} type={} ({})",
        raw.header.version(),
        raw.header.msg_type().code(),
        raw.header.msg_type().name().unwrap_or("unknown")
    );
    match Message::decode(raw)? {
        Message::Simple(message) => {
            println!("text: {}", message.text());
            for attachment in message.attachments() {
                println!(
                    "attachment: {} ({} bytes)",
                    attachment.attachment_type,
                    attachment.data.len()
                );
            }
        }
        Message::Unknown(raw) => println!("payload: 0x{}", hex::encode(&raw.payload)),
    }
    Ok(())
}

struct DemoParty {
    client: MessagingClient,
    address: AccountAddress,
}

async fn demo_party(
    config: &Config,
    ledger: Arc<MemoryLedger>,
    directory: Arc<MemoryKeyDirectory>,
) -> Result<DemoParty> {
    let signer = Arc::new(LocalSigner::generate());
    let address = signer.account_address();
    let encryptor = LocalEncryptor::new(Arc::new(MemoryIdentityStore::new(
        IdentityKeypair::generate(),
    )));
    directory
        .publish_key(address, encryptor.public_key(None)?, 0)
        .await;
    let client = MessagingClient::new(
        config,
        Collaborators {
            ledger,
            key_directory: directory,
            encryptor: Arc::new(encryptor),
            signer,
        },
    )?;
    Ok(DemoParty { client, address })
}

async fn run_demo(config: Config, message: SimpleMessage) -> Result<()> {
    let ledger = Arc::new(MemoryLedger::new(
        config.contract_address()?,
        config.module(),
    ));
    let directory = Arc::new(MemoryKeyDirectory::new());
    let alice = demo_party(&config, ledger.clone(), directory.clone()).await?;
    let bob = demo_party(&config, ledger, directory).await?;

    bob.client.create_store().await?;
    alice.client.send(&bob.address, &message).await?;

    for received in bob.client.get_messages(0, None).await? {
        println!("from {} at {}", received.from, received.timestamp);
        print_message(&received.message)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,acmp=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::new(DEMO_CONTRACT.parse()?),
    };

    match cli.command {
        Commands::Encode { text, attachments } => {
            let message = build_message(text, &attachments)?;
            println!("{}", hex::encode(message.to_bytes()?));
        }
        Commands::Decode { hex: encoded } => {
            let digits = encoded.strip_prefix("0x").unwrap_or(&encoded);
            let bytes = hex::decode(digits).map_err(|e| AcmpError::Serialization(e.to_string()))?;
            print_message(&RawMessage::from_bytes(&bytes)?)?;
        }
        Commands::Keygen => {
            let signer = LocalSigner::generate();
            let identity = IdentityKeypair::generate();
            println!("address: {}", signer.account_address());
            println!("signing_key: 0x{}", hex::encode(signer.secret_bytes()));
            println!("encryption_public_key: {}", PublicKey::from(identity.public));
            println!("encryption_secret: {}", identity.to_base64());
        }
        Commands::Demo { text, attachments } => {
            run_demo(config, build_message(text, &attachments)?).await?;
        }
    }
    Ok(())
}
