use crate::models::Totals;

pub fn render_index(today: &str, totals: &Totals) -> String {
    INDEX_HTML
        .replace("{{TODAY}}", today)
        .replace("{{WEEK}}", &format_minutes(totals.weekly_minutes))
        .replace("{{MONTH}}", &format_minutes(totals.monthly_minutes))
        .replace("{{TOTAL}}", &format_minutes(totals.total_minutes))
}

/// `95` -> `1h 35m`, `60` -> `1h`, `5` -> `5m`.
pub fn format_minutes(minutes: u64) -> String {
    let (hours, mins) = (minutes / 60, minutes % 60);
    match (hours, mins) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Study Calendar</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef3f8;
      --bg-2: #c9dcf0;
      --ink: #23272f;
      --accent: #3a7bd5;
      --done: #2d9d6a;
      --note: #d99a1c;
      --time: #7a4fd1;
      --holiday: #d2467a;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(35, 60, 90, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #f6f8fb 70%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1100px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-size: clamp(2rem, 4vw, 2.8rem);
      margin: 0;
      text-align: center;
    }

    .subtitle {
      margin: 6px 0 0;
      text-align: center;
      color: #5f6670;
    }

    .card {
      background: var(--card);
      border-radius: 22px;
      box-shadow: var(--shadow);
      padding: 22px;
    }

    .totals {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #7d838c;
    }

    .stat .value {
      font-size: 1.8rem;
      font-weight: 600;
      color: var(--accent);
    }

    .backup {
      display: grid;
      gap: 10px;
      align-content: center;
    }

    button {
      appearance: none;
      border: 1px solid rgba(35, 60, 90, 0.15);
      background: white;
      border-radius: 999px;
      padding: 10px 16px;
      font: inherit;
      font-weight: 600;
      cursor: pointer;
    }

    button.primary {
      background: var(--accent);
      color: white;
      border: none;
    }

    .toolbar {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
      margin-bottom: 14px;
    }

    .toolbar h2 {
      margin: 0;
      min-width: 200px;
      text-align: center;
    }

    .filters {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      margin-bottom: 14px;
    }

    .filters input[type="search"] {
      flex: 1;
      min-width: 200px;
      border-radius: 999px;
      border: 1px solid rgba(35, 60, 90, 0.2);
      padding: 10px 16px;
      font: inherit;
    }

    .filters label {
      display: inline-flex;
      align-items: center;
      gap: 6px;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 8px;
    }

    .weekday {
      text-align: center;
      font-size: 0.85rem;
      color: #7d838c;
    }

    .day {
      min-height: 110px;
      border-radius: 14px;
      border: 1px solid rgba(35, 60, 90, 0.1);
      background: white;
      padding: 8px;
      cursor: pointer;
      display: grid;
      align-content: start;
      gap: 4px;
      font-size: 0.8rem;
    }

    .day.today {
      outline: 2px solid var(--accent);
    }

    .day.holiday {
      background: #fdf0f5;
    }

    .day.hidden {
      opacity: 0.25;
    }

    .day .head {
      display: flex;
      justify-content: space-between;
      align-items: center;
      font-size: 0.95rem;
      font-weight: 600;
    }

    .check {
      width: 24px;
      height: 24px;
      padding: 0;
      border-radius: 50%;
    }

    .check.on {
      background: var(--done);
      color: white;
      border: none;
    }

    .tag-holiday { color: var(--holiday); font-style: italic; }
    .tag-note { color: var(--note); }
    .tag-time { color: var(--time); font-weight: 600; }

    dialog {
      border: none;
      border-radius: 22px;
      width: min(560px, 95vw);
      box-shadow: var(--shadow);
      padding: 24px;
    }

    dialog section {
      display: grid;
      gap: 10px;
      margin-bottom: 18px;
    }

    textarea {
      min-height: 110px;
      border-radius: 14px;
      border: 1px solid rgba(35, 60, 90, 0.2);
      padding: 10px;
      font: inherit;
      resize: vertical;
    }

    .row {
      display: flex;
      gap: 8px;
      align-items: center;
    }

    .row input {
      flex: 1;
      border-radius: 999px;
      border: 1px solid rgba(35, 60, 90, 0.2);
      padding: 10px 14px;
      font: inherit;
    }

    .timer-label {
      font-family: ui-monospace, monospace;
      font-size: 1.4rem;
      color: var(--time);
    }

    .status {
      min-height: 1.2em;
      color: #6b645d;
    }

    .status[data-type="error"] { color: #c63b2b; }
    .status[data-type="ok"] { color: #2d7a4b; }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Study Calendar</h1>
      <p class="subtitle">Mark finished days, keep notes, and log study time.</p>
    </header>

    <section class="totals">
      <div class="card stat">
        <div class="label">This week</div>
        <div class="value" id="week-total">{{WEEK}}</div>
      </div>
      <div class="card stat">
        <div class="label">This month</div>
        <div class="value" id="month-total">{{MONTH}}</div>
      </div>
      <div class="card stat">
        <div class="label">All time</div>
        <div class="value" id="all-total">{{TOTAL}}</div>
      </div>
      <div class="card backup">
        <button id="export-btn" type="button">Export data</button>
        <button id="import-btn" type="button">Import data</button>
        <input id="import-file" type="file" accept=".json,application/json" hidden />
      </div>
    </section>

    <section class="card">
      <div class="toolbar">
        <button id="prev" type="button">&larr;</button>
        <h2 id="month-title"></h2>
        <button id="next" type="button">&rarr;</button>
        <button id="today-btn" type="button">Today</button>
      </div>
      <div class="filters">
        <input id="search" type="search" placeholder="Search notes or holidays..." />
        <label><input id="f-notes" type="checkbox" /> Notes only</label>
        <label><input id="f-done" type="checkbox" /> Completed only</label>
        <label><input id="f-time" type="checkbox" /> Time logged only</label>
      </div>
      <div class="grid" id="weekdays"></div>
      <div class="grid" id="calendar"></div>
    </section>

    <div class="status" id="status"></div>
  </main>

  <dialog id="detail">
    <h2 id="detail-title"></h2>
    <p id="detail-holiday" class="tag-holiday"></p>
    <section>
      <button id="detail-toggle" type="button"></button>
    </section>
    <section>
      <strong>Notes</strong>
      <textarea id="detail-note" placeholder="What did you study? Key concepts, topics, insights..."></textarea>
      <button id="detail-save-note" type="button">Save note</button>
    </section>
    <section>
      <strong>Time</strong>
      <div>Total: <span id="detail-minutes" class="tag-time"></span></div>
      <div class="row">
        <button id="detail-timer" class="primary" type="button"></button>
        <span id="detail-timer-label" class="timer-label"></span>
      </div>
      <div class="row">
        <input id="detail-amount" type="number" min="0" placeholder="Minutes" />
        <button id="detail-add" type="button">+ Add</button>
        <button id="detail-sub" type="button">- Remove</button>
      </div>
    </section>
    <div class="row">
      <button id="detail-close" type="button">Close</button>
    </div>
  </dialog>

  <script>
    const TODAY = '{{TODAY}}';
    const WEEKDAYS = ['Sun', 'Mon', 'Tue', 'Wed', 'Thu', 'Fri', 'Sat'];
    const MONTHS = ['January', 'February', 'March', 'April', 'May', 'June',
      'July', 'August', 'September', 'October', 'November', 'December'];

    const $ = (id) => document.getElementById(id);
    const statusEl = $('status');
    const calendarEl = $('calendar');
    const detail = $('detail');

    let viewYear = Number(TODAY.slice(0, 4));
    let viewMonth = Number(TODAY.slice(5, 7));
    let current = null;
    let tick = null;

    const formatMinutes = (minutes) => {
      const hours = Math.floor(minutes / 60);
      const mins = minutes % 60;
      if (hours === 0) return `${mins}m`;
      if (mins === 0) return `${hours}h`;
      return `${hours}h ${mins}m`;
    };

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const request = async (method, url, body) => {
      const options = { method, headers: {} };
      if (body !== undefined) {
        options.headers['content-type'] = 'application/json';
        options.body = JSON.stringify(body);
      }
      const res = await fetch(url, options);
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      return res.json();
    };

    const updateTotals = (totals) => {
      $('week-total').textContent = formatMinutes(totals.weekly_minutes);
      $('month-total').textContent = formatMinutes(totals.monthly_minutes);
      $('all-total').textContent = formatMinutes(totals.total_minutes);
    };

    const monthQuery = () => {
      const params = new URLSearchParams({ year: viewYear, month: viewMonth });
      const q = $('search').value.trim();
      if (q) params.set('q', q);
      if ($('f-notes').checked) params.set('notes_only', 'true');
      if ($('f-done').checked) params.set('completed_only', 'true');
      if ($('f-time').checked) params.set('time_logged_only', 'true');
      return params.toString();
    };

    const renderDay = (day) => {
      const cell = document.createElement('div');
      cell.className = 'day';
      if (day.dateKey === TODAY) cell.classList.add('today');
      if (day.holiday) cell.classList.add('holiday');
      if (!day.visible) cell.classList.add('hidden');

      const head = document.createElement('div');
      head.className = 'head';
      const number = document.createElement('span');
      number.textContent = Number(day.dateKey.slice(8));
      const check = document.createElement('button');
      check.type = 'button';
      check.className = day.crossed ? 'check on' : 'check';
      check.textContent = day.crossed ? '✓' : '';
      check.title = day.crossed ? 'Mark as not completed' : 'Mark as completed';
      check.addEventListener('click', (event) => {
        event.stopPropagation();
        mutate(`/api/days/${day.dateKey}/toggle`).catch((err) => setStatus(err.message, 'error'));
      });
      head.append(number, check);
      cell.append(head);

      if (day.holiday) {
        const holiday = document.createElement('div');
        holiday.className = 'tag-holiday';
        holiday.textContent = day.holiday;
        cell.append(holiday);
      }
      if (day.note) {
        const note = document.createElement('div');
        note.className = 'tag-note';
        note.textContent = day.note.length > 25 ? `${day.note.slice(0, 25)}...` : day.note;
        cell.append(note);
      }
      if (day.minutes > 0 || day.isTimerRunning) {
        const time = document.createElement('div');
        time.className = 'tag-time';
        time.textContent = `${formatMinutes(day.minutes)}${day.isTimerRunning ? ' ⏱' : ''}`;
        cell.append(time);
      }

      cell.addEventListener('click', () => openDetail(day.dateKey).catch((err) => setStatus(err.message, 'error')));
      return cell;
    };

    const loadMonth = async () => {
      const data = await request('GET', `/api/month?${monthQuery()}`);
      $('month-title').textContent = `${MONTHS[data.month - 1]} ${data.year}`;
      updateTotals(data.totals);

      calendarEl.replaceChildren();
      const leading = new Date(data.year, data.month - 1, 1).getDay();
      for (let i = 0; i < leading; i += 1) {
        calendarEl.append(document.createElement('div'));
      }
      data.days.forEach((day) => calendarEl.append(renderDay(day)));
    };

    const stopTick = () => {
      if (tick) {
        clearInterval(tick);
        tick = null;
      }
      $('detail-timer-label').textContent = '';
    };

    const startTick = (timerStart) => {
      stopTick();
      const draw = () => {
        const elapsed = Math.max(0, Math.floor((Date.now() - timerStart) / 1000));
        const pad = (n) => n.toString().padStart(2, '0');
        $('detail-timer-label').textContent =
          `${pad(Math.floor(elapsed / 3600))}:${pad(Math.floor((elapsed % 3600) / 60))}:${pad(elapsed % 60)}`;
      };
      draw();
      tick = setInterval(draw, 1000);
    };

    const showDetail = (entry) => {
      current = entry;
      $('detail-title').textContent = new Date(`${entry.dateKey}T00:00:00`).toLocaleDateString('en-US', {
        weekday: 'long', year: 'numeric', month: 'long', day: 'numeric'
      });
      $('detail-holiday').textContent = entry.holiday || '';
      $('detail-toggle').textContent = entry.crossed ? '✓ Completed' : 'Mark as completed';
      $('detail-toggle').className = entry.crossed ? 'primary' : '';
      $('detail-minutes').textContent = formatMinutes(entry.minutes);
      $('detail-timer').textContent = entry.isTimerRunning ? 'Stop timer' : 'Start timer';
      if (entry.isTimerRunning && entry.timerStart) {
        startTick(entry.timerStart);
      } else {
        stopTick();
      }
    };

    const openDetail = async (dateKey) => {
      const entry = await request('GET', `/api/days/${dateKey}`);
      $('detail-note').value = entry.note;
      $('detail-amount').value = '';
      showDetail(entry);
      detail.showModal();
    };

    const mutate = async (url, body, method = 'POST') => {
      const result = await request(method, url, body);
      if (current && current.dateKey === result.entry.dateKey) {
        showDetail(result.entry);
      }
      setStatus(result.saved ? 'Saved' : 'Changes kept in memory only; storage write failed', result.saved ? 'ok' : 'error');
      await loadMonth();
      return result.entry;
    };

    const adjust = (action) => {
      const amount = $('detail-amount').value;
      if (!amount) return;
      mutate(`/api/days/${current.dateKey}/minutes`, { action, amount })
        .then(() => { $('detail-amount').value = ''; })
        .catch((err) => setStatus(err.message, 'error'));
    };

    $('detail-toggle').addEventListener('click', () => {
      mutate(`/api/days/${current.dateKey}/toggle`).catch((err) => setStatus(err.message, 'error'));
    });
    $('detail-save-note').addEventListener('click', () => {
      mutate(`/api/days/${current.dateKey}`, { note: $('detail-note').value.trim() }, 'PATCH')
        .catch((err) => setStatus(err.message, 'error'));
    });
    $('detail-timer').addEventListener('click', () => {
      const action = current.isTimerRunning ? 'stop' : 'start';
      mutate(`/api/days/${current.dateKey}/timer/${action}`).catch((err) => setStatus(err.message, 'error'));
    });
    $('detail-add').addEventListener('click', () => adjust('add'));
    $('detail-sub').addEventListener('click', () => adjust('sub'));
    $('detail-close').addEventListener('click', () => detail.close());
    detail.addEventListener('close', () => {
      stopTick();
      current = null;
    });

    const shiftMonth = (delta) => {
      const index = viewYear * 12 + (viewMonth - 1) + delta;
      viewYear = Math.floor(index / 12);
      viewMonth = (index % 12) + 1;
      loadMonth().catch((err) => setStatus(err.message, 'error'));
    };

    $('prev').addEventListener('click', () => shiftMonth(-1));
    $('next').addEventListener('click', () => shiftMonth(1));
    $('today-btn').addEventListener('click', () => {
      viewYear = Number(TODAY.slice(0, 4));
      viewMonth = Number(TODAY.slice(5, 7));
      loadMonth().catch((err) => setStatus(err.message, 'error'));
    });
    ['search', 'f-notes', 'f-done', 'f-time'].forEach((id) => {
      $(id).addEventListener('input', () => loadMonth().catch((err) => setStatus(err.message, 'error')));
    });

    $('export-btn').addEventListener('click', () => {
      window.location.href = '/api/export';
    });
    $('import-btn').addEventListener('click', () => $('import-file').click());
    $('import-file').addEventListener('change', async (event) => {
      const file = event.target.files[0];
      if (!file) return;
      const res = await fetch('/api/import', { method: 'POST', body: await file.text() });
      const result = await res.json();
      if (result.success) {
        setStatus('Data imported', 'ok');
        await loadMonth();
      } else {
        setStatus('Import failed: the file is not a valid backup', 'error');
      }
      event.target.value = '';
    });

    WEEKDAYS.forEach((name) => {
      const cell = document.createElement('div');
      cell.className = 'weekday';
      cell.textContent = name;
      $('weekdays').append(cell);
    });

    loadMonth().catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_like_the_calendar() {
        assert_eq!(format_minutes(0), "0m");
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(120), "2h");
        assert_eq!(format_minutes(75), "1h 15m");
    }

    #[test]
    fn index_fills_placeholders() {
        let totals = Totals {
            weekly_minutes: 90,
            monthly_minutes: 150,
            total_minutes: 600,
        };
        let html = render_index("2025-06-04", &totals);
        assert!(html.contains("const TODAY = '2025-06-04';"));
        assert!(html.contains("1h 30m"));
        assert!(html.contains("2h 30m"));
        assert!(html.contains(">10h<"));
        assert!(!html.contains("{{"));
    }
}
