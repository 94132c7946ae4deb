use crate::models::{EntryType, IntakeCategory, QuickButton, TodaySummary, UserSettings};
use crate::settings::NONE_CATEGORY;

pub fn render_index(summary: &TodaySummary, settings: &UserSettings) -> String {
    INDEX_HTML
        .replace("{{DATE}}", &summary.date.format("%A, %b %d").to_string())
        .replace("{{INTAKE}}", &summary.intake_total.to_string())
        .replace("{{INTAKE_COUNT}}", &summary.intake_count.to_string())
        .replace("{{URINE}}", &summary.urine_total.to_string())
        .replace("{{URINE_COUNT}}", &summary.urine_count.to_string())
        .replace("{{NET}}", &summary.net_volume.to_string())
        .replace("{{WATER_DEFAULT}}", &settings.default_water_amount.to_string())
        .replace("{{URINE_DEFAULT}}", &settings.default_urine_amount.to_string())
        .replace("{{STEP}}", &settings.amount_increment.max(1).to_string())
        .replace("{{CATEGORY_OPTIONS}}", &category_options(&settings.intake_categories))
        .replace("{{QUICK_BUTTONS}}", &quick_buttons(&settings.quick_buttons))
}

fn category_options(categories: &[IntakeCategory]) -> String {
    categories
        .iter()
        .map(|c| {
            let selected = if c.id == NONE_CATEGORY { " selected" } else { "" };
            format!(
                r#"<option value="{}"{selected}>{}</option>"#,
                escape_html(&c.id),
                escape_html(&c.label)
            )
        })
        .collect()
}

fn quick_buttons(buttons: &[QuickButton]) -> String {
    buttons
        .iter()
        .filter(|b| b.entry_type != EntryType::Note)
        .map(|b| {
            let kind = match b.entry_type {
                EntryType::Water => "WATER",
                _ => "URINE",
            };
            format!(
                r#"<button class="chip" type="button" data-type="{kind}" data-amount="{}" data-label="{label}">{label} &middot; {} ml</button>"#,
                b.amount,
                b.amount,
                label = escape_html(&b.label),
            )
        })
        .collect()
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>AquaFlow</title>
  <style>
    :root {
      --bg-1: #eef5fb;
      --bg-2: #bcdcf5;
      --ink: #1f2a33;
      --accent: #2563eb;
      --accent-2: #b45309;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(37, 99, 235, 0.15);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #f4f9ff 60%, #ffffff 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(720px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 32px;
      display: grid;
      gap: 24px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.8rem, 4vw, 2.4rem);
    }

    .subtitle {
      margin: 0;
      color: #5b6670;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(150px, 1fr));
      gap: 14px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 16px;
      border: 1px solid rgba(37, 99, 235, 0.1);
      display: grid;
      gap: 6px;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #7b8790;
    }

    .stat .value {
      font-size: 1.6rem;
      font-weight: 600;
      color: var(--accent);
    }

    .stat .value.out {
      color: var(--accent-2);
    }

    form {
      display: grid;
      gap: 12px;
    }

    .row {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
    }

    input, select, textarea {
      font: inherit;
      padding: 10px 12px;
      border-radius: 12px;
      border: 1px solid rgba(31, 42, 51, 0.2);
      background: white;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 12px 18px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    .chip {
      padding: 8px 14px;
      font-size: 0.9rem;
      background: rgba(37, 99, 235, 0.1);
      color: var(--accent);
    }

    .status {
      min-height: 1.2em;
      color: #5b6670;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .status[data-type="ok"] {
      color: #2d7a4b;
    }

    ul.log {
      list-style: none;
      padding: 0;
      margin: 0;
      display: grid;
      gap: 8px;
    }

    ul.log li {
      background: white;
      border-radius: 14px;
      padding: 10px 14px;
      display: flex;
      justify-content: space-between;
      gap: 12px;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>AquaFlow</h1>
      <p class="subtitle" id="date">{{DATE}}</p>
    </header>

    <section class="panel">
      <div class="stat">
        <span class="label">Intake</span>
        <span id="intake" class="value">{{INTAKE}}</span>
        <span class="subtitle"><span id="intake-count">{{INTAKE_COUNT}}</span> entries</span>
      </div>
      <div class="stat">
        <span class="label">Urine</span>
        <span id="urine" class="value out">{{URINE}}</span>
        <span class="subtitle"><span id="urine-count">{{URINE_COUNT}}</span> entries</span>
      </div>
      <div class="stat">
        <span class="label">Net balance</span>
        <span id="net" class="value">{{NET}}</span>
        <span class="subtitle">ml since first intake</span>
      </div>
    </section>

    <form id="log-form">
      <div class="row">
        <select id="type">
          <option value="WATER">Intake</option>
          <option value="URINE">Urine</option>
          <option value="NOTE">Note</option>
        </select>
        <select id="category">{{CATEGORY_OPTIONS}}</select>
        <input id="amount" type="number" min="0" step="{{STEP}}" value="{{WATER_DEFAULT}}" />
        <select id="urgency" hidden>
          <option value="EMPTY">None</option>
          <option value="LOW">Low</option>
          <option value="MEDIUM">Medium</option>
          <option value="HIGH">High</option>
        </select>
      </div>
      <div class="row" id="quick">{{QUICK_BUTTONS}}</div>
      <input id="timestamp" type="datetime-local" />
      <textarea id="notes" rows="2" placeholder="Notes"></textarea>
      <button type="submit">Log entry</button>
      <div id="status" class="status"></div>
    </form>

    <section>
      <h2>Today</h2>
      <ul id="log" class="log"></ul>
    </section>
  </main>

  <script>
    const defaults = { WATER: {{WATER_DEFAULT}}, URINE: {{URINE_DEFAULT}}, NOTE: 0 };
    const $ = (id) => document.getElementById(id);
    const labels = { WATER: 'Intake', URINE: 'Urine', NOTE: 'Note' };

    const setStatus = (message, type) => {
      const el = $('status');
      el.textContent = message;
      el.dataset.type = type || '';
      if (message) {
        setTimeout(() => { el.textContent = ''; el.dataset.type = ''; }, 2000);
      }
    };

    const nowLocal = () => {
      const d = new Date();
      d.setMinutes(d.getMinutes() - d.getTimezoneOffset());
      return d.toISOString().slice(0, 16);
    };

    const syncType = () => {
      const type = $('type').value;
      $('amount').value = defaults[type];
      $('amount').hidden = type === 'NOTE';
      $('category').hidden = type !== 'WATER';
      $('urgency').hidden = type !== 'URINE';
      document.querySelectorAll('#quick .chip').forEach((chip) => {
        chip.hidden = chip.dataset.type !== type;
      });
    };

    const renderToday = (today) => {
      $('intake').textContent = today.intake_total;
      $('intake-count').textContent = today.intake_count;
      $('urine').textContent = today.urine_total;
      $('urine-count').textContent = today.urine_count;
      $('net').textContent = today.net_volume;
      const log = $('log');
      log.innerHTML = '';
      today.entries.slice().reverse().forEach((entry) => {
        const li = document.createElement('li');
        const time = new Date(entry.timestamp).toLocaleTimeString([], { hour: '2-digit', minute: '2-digit' });
        const amount = entry.type === 'NOTE' ? '' : ` ${entry.amount} ml`;
        li.textContent = `${time} ${labels[entry.type]}${amount} ${entry.notes || ''}`;
        log.appendChild(li);
      });
    };

    const refresh = async () => {
      const res = await fetch('/api/today');
      if (!res.ok) {
        throw new Error('Unable to load today');
      }
      renderToday(await res.json());
    };

    $('type').addEventListener('change', syncType);

    document.querySelectorAll('#quick .chip').forEach((chip) => {
      chip.addEventListener('click', () => {
        $('type').value = chip.dataset.type;
        syncType();
        $('amount').value = chip.dataset.amount;
        $('notes').value = chip.dataset.label;
      });
    });

    $('log-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const type = $('type').value;
      const body = {
        type,
        amount: Number($('amount').value) || 0,
        timestamp: new Date($('timestamp').value || nowLocal()).toISOString(),
        notes: $('notes').value,
        intakeTypeId: type === 'WATER' ? $('category').value : null,
        urgency: type === 'URINE' ? $('urgency').value : null,
      };
      const res = await fetch('/api/entries', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(body),
      });
      if (!res.ok) {
        setStatus(await res.text() || 'Request failed', 'error');
        return;
      }
      setStatus('Saved', 'ok');
      $('notes').value = '';
      $('timestamp').value = nowLocal();
      refresh().catch((err) => setStatus(err.message, 'error'));
    });

    $('timestamp').value = nowLocal();
    syncType();
    refresh().catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;
