//! Binary entrypoint for strokefont (made by FontLab https://www.fontlab.com/)

fn main() {
    if let Err(err) = strokefont_cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
