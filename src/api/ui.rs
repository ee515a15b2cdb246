// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Single page interface served at `/`

/// Upload form, confidence slider, annotated preview and per-region text
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Text Extraction Toolkit</title>
<style>
  body { font-family: system-ui, sans-serif; margin: 0; background: #f5f6f8; color: #1d2330; }
  header { background: #1d2330; color: #fff; padding: 1rem 2rem; }
  header h1 { margin: 0; font-size: 1.4rem; }
  main { display: grid; grid-template-columns: 320px 1fr; gap: 1.5rem; padding: 1.5rem 2rem; }
  aside, section { background: #fff; border-radius: 8px; padding: 1rem 1.25rem; box-shadow: 0 1px 3px rgba(0,0,0,.08); }
  label { display: block; margin: .75rem 0 .25rem; font-weight: 600; }
  input[type=range] { width: 100%; }
  button { margin-top: 1rem; padding: .5rem 1rem; border: 0; border-radius: 6px; background: #2d6cdf; color: #fff; cursor: pointer; }
  button:disabled { background: #9aa5b8; cursor: default; }
  #preview { max-width: 100%; border: 1px solid #dde1e8; border-radius: 4px; }
  .region { border-left: 3px solid #22a35a; padding: .25rem .75rem; margin: .5rem 0; }
  .region small { color: #6b7385; }
  .notice { background: #fff6d9; border: 1px solid #f0d77a; padding: .75rem; border-radius: 6px; }
  .error { background: #fde8e8; border: 1px solid #f3a6a6; padding: .75rem; border-radius: 6px; }
  pre { white-space: pre-wrap; background: #f5f6f8; padding: .75rem; border-radius: 6px; }
</style>
</head>
<body>
<header><h1>Text Extraction Toolkit</h1></header>
<main>
  <aside>
    <form id="form">
      <label for="image">Image</label>
      <input id="image" name="image" type="file" accept="image/*" required>

      <label for="confidence">Minimum confidence: <span id="confidence-value">0.70</span></label>
      <input id="confidence" type="range" min="0.3" max="0.95" step="0.05" value="0.7">

      <label for="mode">Mode</label>
      <select id="mode">
        <option value="detect" selected>Detect regions (EAST + OCR)</option>
        <option value="simple">Whole image OCR</option>
      </select>

      <button id="submit" type="submit">Extract text</button>
    </form>
  </aside>
  <section>
    <div id="status"></div>
    <img id="preview" alt="" hidden>
    <h2 id="regions-title" hidden>Detected regions</h2>
    <div id="regions"></div>
    <h2 id="text-title" hidden>All text</h2>
    <pre id="text" hidden></pre>
    <button id="download" type="button" hidden>Download all text</button>
  </section>
</main>
<script>
  const form = document.getElementById('form');
  const slider = document.getElementById('confidence');
  const status = document.getElementById('status');
  const preview = document.getElementById('preview');
  const regions = document.getElementById('regions');
  const text = document.getElementById('text');
  const download = document.getElementById('download');
  let extracted = '';

  slider.addEventListener('input', () => {
    document.getElementById('confidence-value').textContent = Number(slider.value).toFixed(2);
  });

  function show(id, visible) { document.getElementById(id).hidden = !visible; }

  function escapeHtml(value) {
    return value.replace(/[&<>"']/g, c => ({'&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;'}[c]));
  }

  form.addEventListener('submit', async (event) => {
    event.preventDefault();
    const file = document.getElementById('image').files[0];
    if (!file) return;

    const body = new FormData();
    body.append('image', file);
    body.append('minConfidence', slider.value);
    body.append('mode', document.getElementById('mode').value);
    body.append('annotate', 'true');

    document.getElementById('submit').disabled = true;
    status.innerHTML = 'Processing...';
    regions.innerHTML = '';
    ['regions-title', 'text-title', 'text', 'download', 'preview'].forEach(id => show(id, false));

    try {
      const response = await fetch('/v1/extract/upload', { method: 'POST', body });
      const data = await response.json();
      if (!response.ok) {
        const hint = data.details && data.details.hint ? '<br>' + escapeHtml(data.details.hint) : '';
        status.innerHTML = '<div class="error">' + escapeHtml(data.message || 'Extraction failed') + hint + '</div>';
        return;
      }

      if (data.annotatedImage) {
        preview.src = 'data:image/png;base64,' + data.annotatedImage;
        show('preview', true);
      }

      status.innerHTML = data.boxesDetected + ' region(s) detected in ' + data.processingTimeMs + ' ms'
        + (data.usedFallback ? ' (whole image recognized)' : '');

      if (data.noTextFound) {
        status.innerHTML += '<div class="notice">' + escapeHtml(data.message) + '</div>';
        return;
      }

      if (data.regions.length > 0) {
        show('regions-title', true);
        data.regions.forEach((region, i) => {
          const item = document.createElement('div');
          item.className = 'region';
          item.innerHTML = '<small>#' + (i + 1) + ' confidence ' + region.confidence.toFixed(2) + '</small><br>'
            + escapeHtml(region.text || '(no text recognized)');
          regions.appendChild(item);
        });
      }

      extracted = data.text;
      text.textContent = extracted;
      ['text-title', 'text', 'download'].forEach(id => show(id, true));
    } catch (err) {
      status.innerHTML = '<div class="error">' + escapeHtml(String(err)) + '</div>';
    } finally {
      document.getElementById('submit').disabled = false;
    }
  });

  download.addEventListener('click', () => {
    const blob = new Blob([extracted], { type: 'text/plain' });
    const link = document.createElement('a');
    link.href = URL.createObjectURL(blob);
    link.download = 'extracted_text.txt';
    link.click();
    URL.revokeObjectURL(link.href);
  });
</script>
</body>
</html>
"##;
