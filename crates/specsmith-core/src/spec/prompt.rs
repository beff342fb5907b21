//! Prompt construction for the decomposition request.
//!
//! Pure rendering of the four brief fields into a fixed instruction
//! template. The template is advisory text, not an enforced schema: the
//! model may disobey, and downstream stages never assume compliance.

use super::request::CreateSpecRequest;

/// Fixed system framing sent with every completion request.
pub const SYSTEM_PROMPT: &str = "You are a senior product manager and software architect. \
     Always return valid, complete JSON.";

/// Target shape the model is asked to emit.
const SHAPE_REFERENCE: &str = r#"{
  "userStories": [],
  "engineeringTasks": [],
  "risks": []
}"#;

/// Render the user-role prompt for a validated brief.
///
/// Restates the four inputs, shows the expected JSON shape with exactly
/// three array keys, and instructs the model to emit JSON only with
/// non-empty arrays.
pub fn build_prompt(req: &CreateSpecRequest) -> String {
    let mut prompt = String::with_capacity(512);

    prompt.push_str("Generate structured planning output.\n\n");
    prompt.push_str(&format!("Goal: {}\n", req.goal));
    prompt.push_str(&format!("Target Users: {}\n", req.users));
    prompt.push_str(&format!("Constraints: {}\n", req.constraints));
    prompt.push_str(&format!("Template Type: {}\n\n", req.template));

    prompt.push_str("Return ONLY valid JSON:\n\n");
    prompt.push_str(SHAPE_REFERENCE);
    prompt.push_str("\n\nRules:\n");
    prompt.push_str("- Do not include explanations or text outside JSON\n");
    prompt.push_str("- Ensure arrays are not empty\n");
    prompt.push_str(
        "- Each user story is {\"id\", \"story\"}, each engineering task is \
         {\"id\", \"task\"}, each risk is {\"id\", \"risk\", \"mitigation\"}\n",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> CreateSpecRequest {
        CreateSpecRequest {
            goal: "Build a chat app".into(),
            users: "remote teams".into(),
            constraints: "2 week timeline".into(),
            template: "agile".into(),
        }
    }

    #[test]
    fn prompt_restates_all_four_inputs() {
        let prompt = build_prompt(&sample_request());
        assert!(prompt.contains("Goal: Build a chat app"));
        assert!(prompt.contains("Target Users: remote teams"));
        assert!(prompt.contains("Constraints: 2 week timeline"));
        assert!(prompt.contains("Template Type: agile"));
    }

    #[test]
    fn prompt_names_the_three_array_keys() {
        let prompt = build_prompt(&sample_request());
        assert!(prompt.contains("\"userStories\""));
        assert!(prompt.contains("\"engineeringTasks\""));
        assert!(prompt.contains("\"risks\""));
    }

    #[test]
    fn prompt_demands_json_only_and_non_empty_arrays() {
        let prompt = build_prompt(&sample_request());
        assert!(prompt.contains("Return ONLY valid JSON"));
        assert!(prompt.contains("arrays are not empty"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let req = sample_request();
        assert_eq!(build_prompt(&req), build_prompt(&req));
    }

    #[test]
    fn system_prompt_frames_planning_expert() {
        assert!(SYSTEM_PROMPT.contains("product manager"));
        assert!(SYSTEM_PROMPT.contains("JSON"));
    }
}
