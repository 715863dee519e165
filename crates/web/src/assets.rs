//! Inline static assets for the single-page UI.
//!
//! The page is small enough that embedding it beats shipping a static-file
//! directory alongside the binary.

pub const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>FaceLens</title>
<style>
:root {
  --primary: #2563EB;
  --background: #020617;
  --surface: #0F172A;
  --accent: #22C55E;
  --error: #EF4444;
  --text: #E5E7EB;
  --subtext: #9CA3AF;
}
* { box-sizing: border-box; }
body {
  margin: 0;
  background: radial-gradient(circle at top left, #1d4ed8 0, var(--background) 45%);
  color: var(--text);
  font-family: system-ui, -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif;
}
main { max-width: 1120px; margin: 0 auto; padding: 0.75rem 1rem 2rem; }
header { text-align: center; padding: 0.5rem 0 0.75rem; }
header h1 { font-size: 1.8rem; font-weight: 650; letter-spacing: 0.03em; margin: 0; }
header p { font-size: 0.9rem; margin-top: 0.25rem; color: var(--subtext); }
.mode-toggle { display: flex; justify-content: center; gap: 0.5rem; margin-bottom: 1rem; }
.mode-toggle button {
  background: var(--surface); color: var(--text); border: 1px solid rgba(148, 163, 184, 0.35);
  border-radius: 10px; padding: 0.4rem 1.2rem; cursor: pointer; font-size: 0.9rem;
}
.mode-toggle button.active { background: var(--primary); border-color: var(--primary); }
.panel { display: none; }
.panel.active { display: block; }
.metrics { display: grid; grid-template-columns: repeat(3, 1fr); gap: 0.75rem; margin: 1rem 0; }
.metric-card {
  background: linear-gradient(135deg, #020617 0%, #111827 50%, #0f172a 100%);
  border-radius: 18px; padding: 1rem 1.5rem;
  border: 1px solid rgba(148, 163, 184, 0.35);
  box-shadow: 0 18px 45px rgba(15, 23, 42, 0.9);
}
.metric-label { font-size: 0.8rem; text-transform: uppercase; letter-spacing: 0.12em; color: var(--subtext); }
.metric-value { font-size: 1.4rem; font-weight: 600; color: var(--text); }
.metric-hint { font-size: 0.75rem; color: var(--subtext); }
.hint { font-size: 0.9rem; color: var(--subtext); margin-bottom: 0.75rem; }
input[type=file] { color: var(--subtext); }
.result { margin-top: 1.25rem; border-top: 1px solid rgba(148, 163, 184, 0.2); padding-top: 1rem; }
.result h4 { margin: 0 0 0.25rem; }
.result img { max-width: 100%; border-radius: 10px; border: 1px solid rgba(148, 163, 184, 0.25); }
.result .caption { font-size: 0.85rem; color: var(--subtext); margin-top: 0.25rem; }
.error { color: var(--error); font-size: 0.9rem; margin-top: 0.5rem; }
footer.detector-note { text-align: center; font-size: 0.8rem; color: var(--subtext); margin-top: 2rem; }
video, canvas#snapshot { max-width: 100%; border-radius: 10px; border: 1px solid rgba(148, 163, 184, 0.25); }
button.capture {
  background: var(--accent); color: #052e16; border: none; border-radius: 10px;
  padding: 0.5rem 1.4rem; cursor: pointer; font-weight: 600; margin: 0.75rem 0;
}
</style>
</head>
<body>
<main>
  <header>
    <h1>FaceLens</h1>
    <p>Real-time face detection for images &amp; webcam, on your machine.</p>
  </header>

  <div class="mode-toggle">
    <button id="mode-images" class="active">Images</button>
    <button id="mode-webcam">Webcam</button>
  </div>

  <section id="panel-images" class="panel active">
    <div class="hint"><strong>Tip</strong>: upload one or more images; each runs face detection.</div>
    <input id="file-input" type="file" accept="image/*" multiple>
    <div class="metrics">
      <div class="metric-card"><div class="metric-label">Total Faces</div><div id="m-faces" class="metric-value">0</div><div class="metric-hint">Across all images</div></div>
      <div class="metric-card"><div class="metric-label">Avg Latency</div><div id="m-latency" class="metric-value">&ndash;</div><div class="metric-hint">Per image</div></div>
      <div class="metric-card"><div class="metric-label">Images Processed</div><div id="m-count" class="metric-value">0</div><div class="metric-hint">Batch size</div></div>
    </div>
    <div id="image-results"></div>
    <div id="image-error" class="error"></div>
  </section>

  <section id="panel-webcam" class="panel">
    <div class="hint">Capture a frame from your webcam. Each capture runs detection.</div>
    <video id="camera" autoplay playsinline muted></video>
    <canvas id="snapshot" hidden></canvas>
    <div><button id="capture" class="capture">Capture &amp; Detect</button></div>
    <div class="metrics">
      <div class="metric-card"><div class="metric-label">Faces in frame</div><div id="w-faces" class="metric-value">&ndash;</div><div class="metric-hint"></div></div>
      <div class="metric-card"><div class="metric-label">Latency</div><div id="w-latency" class="metric-value">&ndash;</div><div class="metric-hint"></div></div>
      <div class="metric-card"><div class="metric-label">Captures</div><div id="w-count" class="metric-value">0</div><div class="metric-hint"></div></div>
    </div>
    <div id="webcam-result"></div>
    <div id="webcam-error" class="error"></div>
  </section>

  <footer class="detector-note">__DETECTOR_NOTE__</footer>
</main>
<script src="/app.js"></script>
</body>
</html>
"#;

pub const APP_JS: &str = r#"(function () {
  const $ = (id) => document.getElementById(id);

  // --- Mode toggle ---
  function setMode(mode) {
    $('mode-images').classList.toggle('active', mode === 'images');
    $('mode-webcam').classList.toggle('active', mode === 'webcam');
    $('panel-images').classList.toggle('active', mode === 'images');
    $('panel-webcam').classList.toggle('active', mode === 'webcam');
    if (mode === 'webcam') startCamera();
  }
  $('mode-images').onclick = () => setMode('images');
  $('mode-webcam').onclick = () => setMode('webcam');

  async function postImage(bytes, filename) {
    const url = '/api/detect' + (filename ? '?filename=' + encodeURIComponent(filename) : '');
    const resp = await fetch(url, { method: 'POST', body: bytes });
    if (!resp.ok) throw new Error(await resp.text());
    return resp.json();
  }

  function resultCard(title, data) {
    const div = document.createElement('div');
    div.className = 'result';
    const h = document.createElement('h4');
    h.textContent = title;
    const img = document.createElement('img');
    img.src = data.image;
    const cap = document.createElement('div');
    cap.className = 'caption';
    cap.textContent = data.count + ' faces detected - ' + data.label +
      ' (' + data.latency_ms.toFixed(1) + ' ms)';
    div.append(h, img, cap);
    return div;
  }

  // --- Image mode ---
  $('file-input').onchange = async (ev) => {
    const files = Array.from(ev.target.files || []);
    if (!files.length) return;
    $('image-error').textContent = '';
    $('image-results').replaceChildren();

    let totalFaces = 0, totalLatency = 0, processed = 0;
    for (const file of files) {
      try {
        const data = await postImage(await file.arrayBuffer(), file.name);
        totalFaces += data.count;
        totalLatency += data.latency_ms;
        processed += 1;
        $('image-results').appendChild(resultCard(file.name, data));
      } catch (e) {
        $('image-error').textContent = file.name + ': ' + e.message;
      }
    }
    $('m-faces').textContent = totalFaces;
    $('m-count').textContent = processed;
    $('m-latency').textContent = processed ? (totalLatency / processed).toFixed(1) + ' ms' : '-';
  };

  // --- Webcam mode ---
  let stream = null;
  let captures = 0;
  async function startCamera() {
    if (stream) return;
    try {
      stream = await navigator.mediaDevices.getUserMedia({ video: true });
      $('camera').srcObject = stream;
    } catch (e) {
      $('webcam-error').textContent = 'Could not open camera: ' + e.message;
    }
  }

  $('capture').onclick = () => {
    const video = $('camera');
    if (!video.videoWidth) {
      $('webcam-error').textContent = 'Camera is not ready yet.';
      return;
    }
    const canvas = $('snapshot');
    canvas.width = video.videoWidth;
    canvas.height = video.videoHeight;
    canvas.getContext('2d').drawImage(video, 0, 0);
    canvas.toBlob(async (blob) => {
      try {
        $('webcam-error').textContent = '';
        const data = await postImage(await blob.arrayBuffer(), null);
        captures += 1;
        $('w-faces').textContent = data.count;
        $('w-latency').textContent = data.latency_ms.toFixed(1) + ' ms';
        $('w-count').textContent = captures;
        $('webcam-result').replaceChildren(resultCard('Capture ' + captures, data));
      } catch (e) {
        $('webcam-error').textContent = 'Could not read camera frame: ' + e.message;
      }
    }, 'image/png');
  };
})();
"#;
