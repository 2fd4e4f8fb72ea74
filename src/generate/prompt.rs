//! Prompt construction. Every request is built from scratch for one file;
//! nothing carries over between calls.

pub const SYSTEM_PROMPT: &str = "You are an expert software engineer writing developer \
documentation. Answer with Markdown only. Describe what the code does, its public \
functions and classes, how they interact with the rest of the repository, and any \
notable edge cases. Do not invent behaviour that the code does not show.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    Create,
    Update,
}

impl PromptMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub mode: PromptMode,
    pub file_name: String,
    pub system_prompt: String,
    pub user_prompt: String,
}

impl PromptRequest {
    /// Full text as sent to the generator, used for debug dumps.
    pub fn transcript(&self) -> String {
        format!("[system]\n{}\n\n[user]\n{}\n", self.system_prompt, self.user_prompt)
    }
}

pub fn documentation_request(
    file_name: &str,
    file_content: &str,
    root_folder: &str,
    additional_docs: &str,
) -> PromptRequest {
    let dependencies = if additional_docs.is_empty() {
        "This file does not depend on definitions from other files of the repository.".to_string()
    } else {
        format!(
            "Definitions from other files that this file calls, directly or transitively:\n{additional_docs}"
        )
    };
    let user_prompt = format!(
        "Generate documentation for the file `{file_name}` from the repository at `{root_folder}`.\n\n\
         File content:\n```\n{file_content}\n```\n\n{dependencies}\n"
    );
    PromptRequest {
        mode: PromptMode::Create,
        file_name: file_name.to_string(),
        system_prompt: SYSTEM_PROMPT.to_string(),
        user_prompt,
    }
}

pub fn update_request(
    file_name: &str,
    old_docs: &str,
    old_content: &str,
    new_content: &str,
    diff: &str,
    changes: &str,
) -> PromptRequest {
    let user_prompt = format!(
        "The file `{file_name}` has changed. Rewrite its documentation so that it describes \
         the new version. Keep sections that are still accurate.\n\n\
         Current documentation:\n{old_docs}\n\n\
         Previous content:\n```\n{old_content}\n```\n\n\
         New content:\n```\n{new_content}\n```\n\n\
         Diff:\n```diff\n{diff}\n```\n\n\
         Change description:\n{changes}\n"
    );
    PromptRequest {
        mode: PromptMode::Update,
        file_name: file_name.to_string(),
        system_prompt: SYSTEM_PROMPT.to_string(),
        user_prompt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documentation_prompt_embeds_context() {
        let req = documentation_request("main.py", "f1()", "repo", "\nFunction/Class g1:\ng1()\n");
        assert_eq!(req.mode, PromptMode::Create);
        assert!(req.user_prompt.contains("`main.py`"));
        assert!(req.user_prompt.contains("Function/Class g1:"));
        assert!(req.user_prompt.contains("`repo`"));
    }

    #[test]
    fn documentation_prompt_notes_missing_dependencies() {
        let req = documentation_request("solo.py", "pass", "repo", "");
        assert!(req.user_prompt.contains("does not depend on definitions"));
    }

    #[test]
    fn update_prompt_carries_diff_and_changes() {
        let req = update_request("a.py", "# old", "x = 1", "x = 2", "-x = 1\n+x = 2", "- bump x");
        assert_eq!(req.mode, PromptMode::Update);
        assert!(req.user_prompt.contains("# old"));
        assert!(req.user_prompt.contains("+x = 2"));
        assert!(req.user_prompt.contains("- bump x"));
        assert!(req.transcript().starts_with("[system]\n"));
    }
}
