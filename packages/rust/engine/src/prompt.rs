//! Instruction template sent to the reasoning engine.

/// Example document embedded in the instructions.
const EXAMPLE_DOCUMENT: &str = r#"{
  "action": "create",
  "resource_type": "deployment",
  "spec": {
    "name": "nginx-app",
    "namespace": "default",
    "image": "nginx:latest",
    "replicas": 2,
    "port": 80
  }
}"#;

/// Wrap an operator's free-form request in the fixed instructions.
pub fn render_prompt(user_prompt: &str) -> String {
    format!(
        "\nYou are a Kubernetes assistant. Given a prompt, return only a valid JSON in this format:\n\n\
         {EXAMPLE_DOCUMENT}\n\n\
         Prompt: \"{user_prompt}\"\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_request_and_example() {
        let prompt = render_prompt("deploy redis with 3 replicas");
        assert!(prompt.contains("Prompt: \"deploy redis with 3 replicas\""));
        assert!(prompt.contains(r#""resource_type": "deployment""#));
        assert!(prompt.contains("return only a valid JSON"));
    }

    #[test]
    fn example_document_is_valid_json() {
        let value: serde_json::Value =
            serde_json::from_str(EXAMPLE_DOCUMENT).expect("example parses");
        assert_eq!(value["spec"]["replicas"], 2);
    }
}
