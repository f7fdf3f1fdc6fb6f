use anyhow::Context;
use clap::Parser;
use issuing_core::{pci_iframe_url, CardView, DisplayConfig, Environment, DEFAULT_LANG_KEY};

#[derive(Parser, Debug)]
#[command(
    name = "issuing-cli",
    about = "Dựng URL iframe PCI mà cầu nối web-view sẽ nhúng."
)]
struct Args {
    /// Token hiển thị cấp cho thẻ.
    #[arg(short, long)]
    token: String,

    /// Id thẻ do provider cấp.
    #[arg(short, long)]
    card_id: String,

    /// Tên môi trường; khác "prod" thì chọn demo.
    #[arg(short, long, default_value = "demo")]
    env: String,

    /// Dựng view PIN cho thẻ vật lý thay vì view chi tiết.
    #[arg(long)]
    physical: bool,

    /// Khóa ngôn ngữ cho view chi tiết.
    #[arg(long, default_value = DEFAULT_LANG_KEY)]
    lang: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let env = Environment::from_raw(&args.env);
    let (view, config) = if args.physical {
        (CardView::Pin, DisplayConfig::for_pin(&args.token))
    } else {
        (
            CardView::Details,
            DisplayConfig::for_details(&args.token, &args.lang),
        )
    };

    let url = pci_iframe_url(env, &args.card_id, view, &config)
        .context("Không dựng được URL iframe")?;

    println!(
        "Environment: {}\nConfig:\n{}\nURL:\n{url}",
        env.sdk_env(),
        serde_json::to_string_pretty(&config)?,
    );

    Ok(())
}
