//! Topic prompt templates and their renderer.
//!
//! Every template asks for reasoning inside `<scratchpad>` and a single
//! option digit inside `<answer>`, the markers the response parser looks
//! for. Placeholders are `{problem_statement}` and `{answer_option_1}`
//! through `{answer_option_5}`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use sage_shared::topic::{
    BASE_TEMPLATE_KEY, CLASSIC_RIDDLES, LATERAL_THINKING, LOGICAL_TRAPS, MECHANISMS,
    OPTIMIZATION, SEQUENCE_SOLVING, SPATIAL_REASONING,
};
use sage_shared::{normalize_topic, Problem};
use tracing::{error, info};

/// Rendered in place of a missing fifth option
pub const ABSENT_OPTION_5: &str = "Another answer";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(problem_statement|answer_option_[1-5])\}").unwrap());

const OPTIONS_BLOCK: &str = "Options:
1: {answer_option_1}
2: {answer_option_2}
3: {answer_option_3}
4: {answer_option_4}
5: {answer_option_5}

Respond in the required format.
<|eot_id|><|start_header_id|>assistant<|end_header_id|>
";

const BASE: &str = "<|begin_of_text|><|start_header_id|>system<|end_header_id|>
You reason carefully and precisely. Solve the problem in two steps:
1. Work through it step by step inside <scratchpad> tags.
2. Give your final answer inside <answer> tags. The answer must be ONLY the number of the correct option.
<|eot_id|><|start_header_id|>user<|end_header_id|>
Problem: \"{problem_statement}\"

";

const BASE_GUIDE: &str = "<scratchpad>
(Reasoning goes here...)
</scratchpad>
<answer>
(A single digit goes here)
</answer>
";

const RIDDLES: &str = "<|begin_of_text|><|start_header_id|>system<|end_header_id|>
You are an expert riddle solver.
1. Inside <scratchpad> tags, look for the wordplay and the trap, step by step.
2. Give your final answer inside <answer> tags. The answer must be ONLY the number of the correct option.
<|eot_id|><|start_header_id|>user<|end_header_id|>
Example: \"You are in a race and you overtake the second person. What position are you in now?\"
Options: 1: First, 2: Second, 3: Third, 4: Fourth, 5: Another answer
Expected response:
<scratchpad>
Overtaking the runner in second place puts me in their position. I am second; they are now third.
</scratchpad>
<answer>
2
</answer>

---
Problem: \"{problem_statement}\"

";

const SPATIAL: &str = "<|begin_of_text|><|start_header_id|>system<|end_header_id|>
You are an expert in spatial and geometric reasoning.
1. Inside <scratchpad> tags, picture the setup and reason step by step.
2. Give your final answer inside <answer> tags. The answer must be ONLY the number of the correct option.
<|eot_id|><|start_header_id|>user<|end_header_id|>
Problem: \"{problem_statement}\"

";

const SPATIAL_GUIDE: &str = "<scratchpad>
1. Picture the setup described.
2. List every spatial constraint and relationship.
3. Do the calculations or deductions needed.
4. Compare the result with the options.
</scratchpad>
<answer>
(A single digit goes here)
</answer>
";

const LATERAL: &str = "<|begin_of_text|><|start_header_id|>system<|end_header_id|>
You are an expert in lateral thinking and non-obvious solutions.
1. Inside <scratchpad> tags, look for double meanings and hidden assumptions.
2. Give your final answer inside <answer> tags. The answer must be ONLY the number of the correct option.
<|eot_id|><|start_header_id|>user<|end_header_id|>
Example: \"A woman shoots her husband, holds him underwater, and hangs him. 5 minutes later, they enjoy dinner together. How?\"
Options: 1: Twin sister, 2: Photography process, 3: He's a ghost, 4: They made up, 5: Another answer
Expected response:
<scratchpad>
The verbs have double meanings. She shoots a picture, develops it in a bath, and hangs the print to dry.
</scratchpad>
<answer>
2
</answer>

---
Problem: \"{problem_statement}\"

";

const MECHANISM: &str = "<|begin_of_text|><|start_header_id|>system<|end_header_id|>
You are a systems engineer who analyses processes and state changes.
1. Inside <scratchpad> tags, model the system and simulate each action.
2. Give your final answer inside <answer> tags. The answer must be ONLY the number of the correct option.
<|eot_id|><|start_header_id|>user<|end_header_id|>
Problem: \"{problem_statement}\"

";

const MECHANISM_GUIDE: &str = "<scratchpad>
1. Identify the components and their initial states.
2. List the allowed actions and what each one changes.
3. Simulate the actions to reach the final state.
4. Compare the outcome with the options.
</scratchpad>
<answer>
(A single digit goes here)
</answer>
";

const SEQUENCE: &str = "<|begin_of_text|><|start_header_id|>system<|end_header_id|>
You are a mathematician who specialises in number sequences.
1. Inside <scratchpad> tags, find the pattern by taking differences between terms.
2. Give your final answer inside <answer> tags. The answer must be ONLY the number of the correct option.
<|eot_id|><|start_header_id|>user<|end_header_id|>
Example: \"A sequence of numbers: 1, 5, 12, 22, 35, ?\"
Options: 1: 42, 2: 49, 3: 51, 4: 56, 5: Another answer
Expected response:
<scratchpad>
First differences: 4, 7, 10, 13. Second differences: 3, 3, 3, so the pattern is quadratic.
Next first difference is 16, next term is 35 + 16 = 51, which is option 3.
</scratchpad>
<answer>
3
</answer>

---
Problem: \"{problem_statement}\"

";

const OPTIMIZATION_TEMPLATE: &str = "<|begin_of_text|><|start_header_id|>system<|end_header_id|>
You are an expert in optimization and planning.
1. Inside <scratchpad> tags, weigh every constraint and objective to find the most efficient plan.
2. Give your final answer inside <answer> tags. The answer must be ONLY the number of the correct option.
<|eot_id|><|start_header_id|>user<|end_header_id|>
Problem: \"{problem_statement}\"

";

const OPTIMIZATION_GUIDE: &str = "<scratchpad>
1. List the tasks, their costs or durations, and the constraints.
2. Evaluate the candidate orders or paths.
3. Pick the one that minimises cost or time, or maximises value.
4. Compare the result with the options.
</scratchpad>
<answer>
(A single digit goes here)
</answer>
";

const LOGICAL: &str = "<|begin_of_text|><|start_header_id|>system<|end_header_id|>
You are an expert at spotting logical traps and contradictory premises.
1. Inside <scratchpad> tags, check the statement for conditions that cannot all hold.
2. Give your final answer inside <answer> tags. The answer must be ONLY the number of the correct option.
<|eot_id|><|start_header_id|>user<|end_header_id|>
Example: \"In a square room, a lamp must be equidistant from corners A, B, and C, and also twice as far from corner D as it is from A. Where should it be placed?\"
Options: 1: Center of room, 2: Corner A, 3: Halfway, 4: Nowhere, because it's a logical trap, 5: Another answer
Expected response:
<scratchpad>
Equidistance from A, B and C forces the centre of the square, which is also equidistant from D. Then PD = PA and PD = 2 PA, so PA = 0, which is impossible. The premises contradict each other.
</scratchpad>
<answer>
4
</answer>

---
Problem: \"{problem_statement}\"

";

/// Assemble the built-in templates, keyed by topic
fn builtin_templates() -> BTreeMap<String, String> {
    let with_guide = |head: &str, guide: &str| format!("{}{}{}", head, OPTIONS_BLOCK, guide);
    let few_shot = |head: &str| format!("{}{}", head, OPTIONS_BLOCK);

    BTreeMap::from([
        (BASE_TEMPLATE_KEY.to_string(), with_guide(BASE, BASE_GUIDE)),
        (CLASSIC_RIDDLES.to_string(), few_shot(RIDDLES)),
        (SPATIAL_REASONING.to_string(), with_guide(SPATIAL, SPATIAL_GUIDE)),
        (LATERAL_THINKING.to_string(), few_shot(LATERAL)),
        (MECHANISMS.to_string(), with_guide(MECHANISM, MECHANISM_GUIDE)),
        (SEQUENCE_SOLVING.to_string(), few_shot(SEQUENCE)),
        (OPTIMIZATION.to_string(), with_guide(OPTIMIZATION_TEMPLATE, OPTIMIZATION_GUIDE)),
        (LOGICAL_TRAPS.to_string(), few_shot(LOGICAL)),
    ])
}

/// Selects and renders the prompt for a topic
pub struct PromptRouter {
    templates: BTreeMap<String, String>,
}

impl PromptRouter {
    pub fn new() -> Self {
        Self {
            templates: builtin_templates(),
        }
    }

    /// Add or replace a template; the key is normalised
    pub fn with_template(mut self, topic: &str, template: impl Into<String>) -> Self {
        self.templates.insert(normalize_topic(topic), template.into());
        self
    }

    pub fn keys(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    /// Template for `topic`, or the base template
    pub fn template(&self, topic: &str) -> &str {
        let key = normalize_topic(topic);
        self.templates
            .get(&key)
            .or_else(|| self.templates.get(BASE_TEMPLATE_KEY))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Render the prompt for `problem`.
    ///
    /// Returns an empty string when the statement or any of options 1-4 is
    /// missing.
    pub fn get_prompt(&self, topic: &str, problem: &Problem) -> String {
        let key = normalize_topic(topic);
        let selected = if self.templates.contains_key(&key) {
            key.as_str()
        } else {
            BASE_TEMPLATE_KEY
        };
        info!("Selected '{}' prompt template", selected);

        if let Err(e) = problem.validate() {
            error!("Failed to format prompt. Data key missing: {}", e);
            return String::new();
        }

        let template = self.template(topic);
        PLACEHOLDER
            .replace_all(template, |caps: &Captures<'_>| field_value(problem, &caps[1]))
            .into_owned()
    }
}

impl Default for PromptRouter {
    fn default() -> Self {
        Self::new()
    }
}

fn field_value(problem: &Problem, name: &str) -> String {
    let Some(slot) = name
        .strip_prefix("answer_option_")
        .and_then(|n| n.parse::<u8>().ok())
    else {
        return problem.statement().unwrap_or_default().to_string();
    };
    match problem.option(slot) {
        Some(text) => text.to_string(),
        None if slot == 5 => ABSENT_OPTION_5.to_string(),
        None => String::new(),
    }
}
