//! Canned bot replies for each point in the intake conversation.

/// Client-side command that (re)opens the conversation.
pub const START_COMMAND: &str = "__start__";

/// First message shown when a student opens the chat or greets the bot.
pub fn greeting() -> &'static str {
    "Hi, my name is iMu. I am here to help you with your query. \
     Could you please tell me your full name?"
}

pub fn ask_name() -> &'static str {
    "Hi! Could you please tell me your full name?"
}

pub fn ask_year(name: &str) -> String {
    format!(
        "Thanks, {name}. Which education year are you in? \
         (12th_pass / 1st_year / 2nd_year / 3rd_year / 4th_year)"
    )
}

pub fn ask_query(name: &str) -> String {
    format!(
        "Thanks, {name}. Could you please briefly describe your question or issue? \
         (You may start with 'My query is' if you like.)"
    )
}

pub fn confirmation(name: &str, unit_name: &str) -> String {
    format!(
        "Thank you {name}. Your query has been submitted to the {unit_name}. \
         They will reach out to you."
    )
}

pub fn already_submitted() -> &'static str {
    "Your query is already submitted."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_interpolate_name_and_unit() {
        assert!(ask_year("Alice").contains("Alice"));
        assert!(ask_query("Bob").contains("Bob"));
        let confirm = confirmation("Alice", "Student Welfare Unit");
        assert!(confirm.contains("Alice"));
        assert!(confirm.contains("Student Welfare Unit"));
    }
}
