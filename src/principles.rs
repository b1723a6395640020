//! Prompt-writing guidelines shown by `promptdeck principles`

/// Short guide to writing effective templates
pub const PROMPTING_PRINCIPLES: &str = r#"Prompting Principles

1. Write clear and specific instructions
2. Give the model time to think

Tactics

Separate the parts of the input with delimiters
  Triple quotes, triple backticks, <tag></tag> or a colon all work. The
  model then knows which text is instruction and which is material.

Ask for structured output
  Request JSON, HTML or a diagram notation when the result feeds another
  tool.

Ask the model to check its preconditions
  "If the text contains a sequence of instructions, rewrite them as
  Step 1 - ..., Step 2 - .... Otherwise answer: No steps provided."

Show a few examples first
  Give one or two exchanges in the style you want, then the real request.

Spell out the steps of the task
  1 - Summarize the text delimited by triple backticks in one sentence.
  2 - Translate the summary into French.
  3 - Output a JSON object with the keys french_summary and num_names.

Let the model work out its own answer before judging
  "First solve the problem yourself. Then compare your solution with the
  given one. Do not decide whether it is correct until you have done the
  problem yourself."

Template placeholders
  Write {variable} wherever a value should be filled in at run time, and
  {{ or }} for a literal brace. `promptdeck templates vars NAME` lists the
  variables a template expects.
"#;
