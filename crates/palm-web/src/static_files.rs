//! 静态页面

use axum::response::Html;
use std::path::Path;
use tower_http::services::ServeDir;
use tracing::error;

/// 静态资源目录服务
pub fn create_static_service(root_dir: impl AsRef<Path>) -> ServeDir {
    let root_dir = root_dir.as_ref();
    if let Err(e) = std::fs::create_dir_all(root_dir) {
        error!("Failed to create static directory {}: {}", root_dir.display(), e);
    }

    ServeDir::new(root_dir).append_index_html_on_directories(true)
}

/// 首页
pub async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>PalmAI</title>
    <style>
        body { font-family: sans-serif; margin: 0; padding: 2rem; background: #f7faf5; color: #1f2d1f; }
        body.dark { background: #141a14; color: #e4eee4; }
        .card { display: inline-block; width: 220px; margin: .5rem; padding: 1rem; border-radius: 8px; background: rgba(0,0,0,.05); cursor: pointer; vertical-align: top; }
        #preview img { max-width: 320px; }
        #notifications div { margin: .25rem 0; padding: .5rem; border-radius: 4px; background: #fde8e8; }
        #notifications div.info { background: #e8f4fd; }
    </style>
</head>
<body>
    <h1>PalmAI</h1>
    <button id="theme">Toggle theme</button>
    <section>
        <input type="file" id="file" accept="image/jpeg,image/png">
        <div id="preview"></div>
        <button id="analyze">Analyze</button>
        <button id="clear">New analysis</button>
        <div id="progress"></div>
        <div id="result"></div>
        <a href="/api/report?format=html" target="_blank">Printable report</a>
    </section>
    <div id="notifications"></div>
    <section id="cards"></section>
    <script>
        const $ = (id) => document.getElementById(id);

        // 所有接口文本都按纯文本写入页面
        function node(tag, text, className) {
            const el = document.createElement(tag);
            if (text !== undefined) el.textContent = text;
            if (className) el.className = className;
            return el;
        }

        function showNotice(level, message, displayMs) {
            const el = node('div', message, level);
            $('notifications').appendChild(el);
            if (displayMs) setTimeout(() => el.remove(), displayMs);
        }

        async function applyTheme(theme) { document.body.classList.toggle('dark', theme === 'dark'); }
        async function loadTheme() { const r = await fetch('/api/theme'); applyTheme((await r.json()).theme); }
        $('theme').onclick = async () => { const r = await fetch('/api/theme/toggle', { method: 'POST' }); applyTheme((await r.json()).theme); };

        async function loadCards() {
            const data = await (await fetch('/api/diseases')).json();
            if (data.notice) showNotice('error', data.notice);
            $('cards').replaceChildren();
            for (const card of data.diseases) {
                const el = node('div', undefined, 'card');
                const symptoms = node('ul');
                for (const s of card.key_symptoms) symptoms.appendChild(node('li', s));
                el.append(node('strong', card.name), node('br'), node('small', card.severity), symptoms);
                el.onclick = async () => {
                    const d = await (await fetch(`/api/diseases/${card.slot}`)).json();
                    alert(`${d.name}\n\n${d.description}\n\nSymptoms:\n- ${d.symptoms.join('\n- ')}`);
                };
                $('cards').appendChild(el);
            }
        }

        async function pollNotifications() {
            const data = await (await fetch('/api/notifications')).json();
            for (const n of data.notifications) showNotice(n.level, n.message, n.display_ms);
        }

        async function refresh() {
            const s = await (await fetch('/api/analysis')).json();
            $('preview').replaceChildren();
            if (s.pending_image) {
                const img = node('img');
                img.src = `/api/analysis/image?${encodeURIComponent(s.pending_image.id)}`;
                $('preview').append(img, node('p', s.pending_image.name));
            }
            $('progress').textContent = s.state === 'analyzing' && s.progress.current ? s.progress.current : '';
            $('result').replaceChildren();
            if (s.result) {
                $('result').append(
                    node('h2', s.result.name),
                    node('p', `Confidence: ${s.result.confidence_percent}%`),
                    node('p', `Severity: ${s.result.severity}`),
                );
            }
            await pollNotifications();
            if (s.state === 'analyzing') setTimeout(refresh, 500);
        }

        $('file').onchange = async (e) => {
            const file = e.target.files[0];
            if (!file) return;
            await fetch('/api/analysis/image', { method: 'POST', headers: { 'Content-Type': file.type, 'X-File-Name': file.name }, body: file });
            e.target.value = '';
            refresh();
        };
        $('analyze').onclick = async () => { await fetch('/api/analysis/start', { method: 'POST' }); refresh(); };
        $('clear').onclick = async () => { await fetch('/api/analysis', { method: 'DELETE' }); refresh(); };

        loadTheme();
        loadCards();
        refresh();
    </script>
</body>
</html>
"#;
