use bioshed::cli::commands::FAILURE_EXIT;
use bioshed::ui::output;

fn main() {
    let code = match bioshed::cli::run() {
        Ok(code) => code,
        Err(e) => {
            output::error(format!("{:#}", e));
            FAILURE_EXIT
        }
    };
    std::process::exit(code);
}
