use anyhow::Result;
use console::style;
use decomment_core::is_affirmative;
use dialoguer::Input;
use std::io::{self, BufRead, IsTerminal, Write};

const PROMPT: &str = "Do you want to continue? (yes/no)";

pub fn confirm_processing(no_confirm: bool) -> Result<bool> {
    if no_confirm {
        return Ok(true);
    }

    let answer = if io::stdin().is_terminal() && console::user_attended_stderr() {
        Input::<String>::new()
            .with_prompt(PROMPT)
            .allow_empty(true)
            .interact_text()?
    } else {
        read_piped_answer()?
    };

    let confirmed = is_affirmative(&answer);
    if !confirmed {
        println!("\n{}", style("❌ Operation cancelled.").red());
    }
    Ok(confirmed)
}

fn read_piped_answer() -> Result<String> {
    print!("{}: ", PROMPT);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}
