/// System prompt shared by both oracle calls.
pub const EXTRACTION_SYSTEM_PROMPT: &str = "You are a medical expert specializing in \
pharmacovigilance and information extraction. Respond ONLY with a valid JSON object. \
Do not include any explanatory text outside the JSON.";

/// Token budget for the diagnosis call (single short string).
pub const DIAGNOSIS_MAX_TOKENS: u32 = 300;

/// Token budget for the event-list call.
pub const EVENTS_MAX_TOKENS: u32 = 500;

/// Ask for conditions diagnosed after treatment began, excluding the indication.
pub fn build_diagnosis_prompt(text: &str) -> String {
    format!(
        "Extract ONLY NEW conditions that were diagnosed AFTER the patient started the medication.\n\n\
STEP 1: Establish the timeline: what happened BEFORE and AFTER the medication.\n\
STEP 2: Identify the medication that was prescribed.\n\
STEP 3: Find conditions that were newly diagnosed AFTER starting it.\n\n\
RULES:\n\
1. Do NOT extract conditions that existed before the medication. Those are indications.\n\
2. Do NOT extract the condition the medication was prescribed for.\n\
3. Look for temporal cues such as \"after taking\", \"following treatment\", \"subsequently diagnosed\".\n\
4. Look for \"diagnosed with\", \"diagnosis of\", \"diagnosed as having\" occurring after medication use.\n\
5. If the condition is drug-induced (e.g. \"drug-induced hepatitis\"), keep the complete diagnosis.\n\
6. If several new conditions were diagnosed, separate them with commas.\n\n\
Do NOT extract:\n\
- \"Patient had depression, so was prescribed an antidepressant\" (depression is the indication)\n\
- \"Patient complained of headaches, doctor prescribed painkillers\" (headaches is the indication)\n\n\
DO extract:\n\
- \"After taking the medication, patient was diagnosed with liver damage\"\n\
- \"Subsequently diagnosed with medication-induced tremors\"\n\n\
Text:\n{text}\n\n\
Return JSON in exactly this shape:\n\
{{\n  \"Diagnosed_Condition\": \"the new diagnosed condition, or an empty string if none\"\n}}"
    )
}

/// Ask for up to five verbatim adverse-event terms with a provisional severity each.
pub fn build_events_prompt(text: &str) -> String {
    format!(
        "Extract adverse events from the medical text and classify their severity.\n\n\
EXTRACTION RULES:\n\
1. Extract ONLY adverse events that occurred AFTER taking the medication.\n\
2. Use ONLY the exact terms that appear in the original text. Do not paraphrase or normalize.\n\
3. Extract each adverse event only ONCE.\n\
4. Extract at most 5 adverse events, most relevant first.\n\n\
SEVERITY (choose ONE per event):\n\
- \"Fatal or death\": the patient actually died (died, passed away, death, deceased, expired).\n\
- \"Life threatening\": immediate risk of death, e.g. ventilator support, resuscitation, \"critical condition\".\n\
- \"Inpatient hospitalization or prolongation of hospitalization\": hospital admission, emergency room visit, prolonged stay.\n\
- \"None of the above\": all other events such as nausea, drowsiness, headache, fatigue, dry mouth.\n\n\
Text: {text}\n\n\
Return JSON in exactly this shape:\n\
{{\n  \"Adverse_Events\": [\n    {{\n      \"Term\": \"exact term from the text\",\n      \"Severity\": \"severity classification\"\n    }}\n  ]\n}}"
    )
}
