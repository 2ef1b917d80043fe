use crate::evaluation::models::{EvaluationResult, Role};
use crate::render::chart::radar_chart;
use crate::render::escape_html;
use crate::render::table::evidence_table;
use crate::session::{Notice, Session};

const STYLE: &str = r#"
body { font-family: 'Inter', system-ui, sans-serif; color: #1a1a1a; background: #f3f4f6; margin: 0; }
main { max-width: 1200px; margin: 0 auto; padding: 2rem 1rem 5rem; }
.header-box { background: linear-gradient(135deg, #4c1d95 0%, #7c3aed 100%); color: #fff; padding: 35px; border-radius: 16px; text-align: center; margin-bottom: 30px; }
.css-card { background: #fff; padding: 24px; border-radius: 16px; border: 1px solid #e5e7eb; margin-bottom: 24px; }
.columns { display: grid; grid-template-columns: 1fr 1.5fr; gap: 24px; align-items: start; }
label { display: block; font-weight: 600; margin: 12px 0 4px; }
input[type=text], input[type=password], select, textarea { width: 100%; box-sizing: border-box; padding: 8px; border: 1px solid #d1d5db; border-radius: 8px; font: inherit; }
button { margin-top: 12px; padding: 10px 16px; border: 0; border-radius: 8px; background: #6d28d9; color: #fff; font-weight: 600; cursor: pointer; }
button:disabled { background: #9ca3af; cursor: wait; }
.notice { padding: 12px 16px; border-radius: 8px; margin-bottom: 16px; }
.notice.success { background: #dcfce7; color: #166534; }
.notice.info { background: #dbeafe; color: #1e40af; }
.notice.error { background: #fee2e2; color: #991b1b; }
.score-row { display: flex; gap: 24px; align-items: center; }
.score-container { text-align: center; padding: 20px; min-width: 160px; }
.score-val { font-size: 4rem; font-weight: 800; color: #6d28d9; line-height: 1; }
.score-label { font-size: 0.85rem; font-weight: 700; color: #4b5563; text-transform: uppercase; margin-top: 10px; letter-spacing: 1.5px; }
.narrative-box { background: #fdf4ff; border-left: 6px solid #d946ef; padding: 30px; border-radius: 12px; margin: 20px 0 25px; }
.recommendation { background: #dcfce7; color: #166534; padding: 12px 16px; border-radius: 8px; }
.styled-table { width: 100%; border-collapse: collapse; table-layout: fixed; font-size: 0.95rem; }
.styled-table th { background: #5b21b6; color: #fff; font-weight: 600; padding: 14px 16px; text-align: left; }
.styled-table td { padding: 16px; border-bottom: 1px solid #f3f4f6; vertical-align: top; color: #374151; line-height: 1.6; word-wrap: break-word; }
.styled-table td.score { text-align: center; font-weight: bold; }
.col-quote { width: 50%; text-align: justify; }
.muted { color: #6b7280; font-size: 0.9rem; }
"#;

const SCRIPT: &str = r#"
(function () {
  const button = document.getElementById('record');
  const status = document.getElementById('record-status');
  let recorder = null;
  let chunks = [];
  button.addEventListener('click', async function () {
    if (recorder && recorder.state === 'recording') { recorder.stop(); return; }
    let stream;
    try {
      stream = await navigator.mediaDevices.getUserMedia({ audio: true });
    } catch (e) {
      status.textContent = 'Microphone unavailable. Please type the evaluation manually.';
      return;
    }
    await fetch('/session/recording', { method: 'POST' });
    recorder = new MediaRecorder(stream, { mimeType: 'audio/webm' });
    chunks = [];
    recorder.ondataavailable = function (e) { chunks.push(e.data); };
    recorder.onstop = async function () {
      stream.getTracks().forEach(function (t) { t.stop(); });
      button.disabled = true;
      status.textContent = 'Listening...';
      const form = new FormData();
      form.append('audio', new Blob(chunks, { type: 'audio/webm' }), 'recording.webm');
      await fetch('/session/transcribe', { method: 'POST', body: form });
      window.location.reload();
    };
    recorder.start();
    button.textContent = 'Stop';
    status.textContent = 'Recording...';
  });
  document.getElementById('analyze-form').addEventListener('submit', function () {
    const submit = document.getElementById('analyze');
    submit.disabled = true;
    submit.textContent = 'AI is plotting categories and computing the score...';
  });
})();
"#;

/// The whole dashboard page for one session.
pub fn render_dashboard(session: &Session) -> String {
    let results = match &session.result {
        Some(result) => result_panel(result),
        None if session.phase.is_busy() => {
            r#"<p class="muted">Waiting for the AI to finish...</p>"#.to_string()
        }
        None => r#"<p class="muted">Results appear here after you analyze a transcript.</p>"#
            .to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>QPR 360° Report (AI Powered)</title>
<style>{STYLE}</style>
</head>
<body data-phase="{phase:?}">
<main>
<div class="header-box"><h1>QPR Report Dashboard 360°</h1><p>Performance Evaluation System</p></div>
{notice}
{api_key}
{recap}
<section class="css-card">
<h3>Leader &amp; Deputy Evaluation (AI Scoring &amp; Plotting)</h3>
<p class="muted">Speak your evaluation freely. The AI listens, sorts what you said into categories, and scores each one.</p>
<div class="columns">
<div>{input}</div>
<div id="results">{results}</div>
</div>
</section>
</main>
<script>{SCRIPT}</script>
</body>
</html>"#,
        phase = session.phase,
        notice = notice_banner(session.notice.as_ref()),
        api_key = api_key_form(session),
        recap = recap_form(session),
        input = input_form(session),
    )
}

fn notice_banner(notice: Option<&Notice>) -> String {
    let (class, text) = match notice {
        Some(Notice::Success(text)) => ("success", text),
        Some(Notice::Info(text)) => ("info", text),
        Some(Notice::Error(text)) => ("error", text),
        None => return String::new(),
    };
    format!(
        r#"<div class="notice {class}" role="status">{}</div>"#,
        escape_html(text)
    )
}

fn api_key_form(session: &Session) -> String {
    let status = if session.has_api_key() {
        r#"<span class="muted">Key set for this session.</span>"#
    } else {
        r#"<span class="muted">Enter your API key to enable scoring.</span>"#
    };
    // The key is never echoed back into the page.
    format!(
        r#"<section class="css-card">
<h3>AI Settings</h3>
<form method="post" action="/session/api-key">
<label for="api_key">Google Gemini API Key</label>
<input id="api_key" name="api_key" type="password" autocomplete="off" value="">
<button type="submit">Save key</button> {status}
</form>
</section>"#
    )
}

fn recap_form(session: &Session) -> String {
    let loaded = session
        .recap
        .as_ref()
        .map(|r| {
            format!(
                r#"<p class="muted">Loaded {}: {}</p>"#,
                escape_html(&r.file_name),
                escape_html(&r.columns.join(", "))
            )
        })
        .unwrap_or_default();
    format!(
        r#"<section class="css-card">
<h3>Member Evaluation (Excel)</h3>
<form method="post" action="/recap/upload" enctype="multipart/form-data">
<label for="file">Upload QPR II Excel file (.xlsx)</label>
<input id="file" name="file" type="file" accept=".xlsx">
<button type="submit">Upload</button>
</form>
{loaded}
</section>"#
    )
}

fn input_form(session: &Session) -> String {
    let input = &session.input;
    let options: String = Role::ALL
        .iter()
        .map(|role| {
            let selected = if *role == input.role { " selected" } else { "" };
            format!(
                r#"<option value="{label}"{selected}>{label}</option>"#,
                label = role.label()
            )
        })
        .collect();
    let disabled = if session.phase.is_busy() { " disabled" } else { "" };

    format!(
        r#"<form id="analyze-form" method="post" action="/session/analyze">
<label for="target_name">Name of the person evaluated</label>
<input id="target_name" name="target_name" type="text" placeholder="Budi Santoso" value="{name}">
<label for="role">Position</label>
<select id="role" name="role">{options}</select>
<hr>
<p><b>1. Record your voice</b></p>
<button type="button" id="record"{disabled}>Start speaking</button> <span id="record-status" class="muted"></span>
<p><b>2. Transcript (editable)</b></p>
<textarea id="transcript" name="transcript" rows="7" placeholder="Example: Kinerjanya bagus banget target tercapai, tapi sayangnya sering telat pas meeting...">{transcript}</textarea>
<button type="submit" id="analyze"{disabled}>Analyze &amp; score automatically</button>
</form>"#,
        name = escape_html(&input.target_name),
        transcript = escape_html(&input.transcript),
    )
}

/// Score card, radar chart, evidence table, narrative, and recommendation.
pub fn result_panel(result: &EvaluationResult) -> String {
    format!(
        r#"<h3>AI Evaluation Result: {name}</h3>
<div class="score-row">
<div class="score-container"><div class="score-val">{final_score:.1}</div><div class="score-label">AI Score</div></div>
<div class="chart">{chart}</div>
</div>
<h4>Voice-to-Category Plotting</h4>
{table}
<h4>Final Conclusion</h4>
<div class="narrative-box">{summary}</div>
<div class="recommendation">Recommendation: {recommendation}</div>
<p class="muted">{role} &middot; evaluated {at}</p>"#,
        name = escape_html(&result.target_name),
        final_score = result.final_score(),
        chart = radar_chart(&result.scores),
        table = evidence_table(result),
        summary = escape_html(&result.summary),
        recommendation = escape_html(&result.recommendation),
        role = result.role.label(),
        at = result.evaluated_at.format("%Y-%m-%d %H:%M UTC"),
    )
}
