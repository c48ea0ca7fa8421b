//! Injected JavaScript snippets
//!
//! Each runs via Runtime.callFunctionOn with `this` bound to the target
//! node and returns a by-value result.

/// Visibility check: rendered, not display:none/hidden, non-zero opacity
pub const VISIBLE_JS: &str = r#"function() {
    if (this.nodeType === Node.TEXT_NODE) {
        return this.parentElement ? true : false;
    }
    const style = window.getComputedStyle(this);
    if (style.getPropertyValue('display') === 'none') return false;
    if (style.getPropertyValue('visibility') === 'hidden') return false;
    if (style.getPropertyValue('opacity') === '0') return false;
    return true;
}"#;

/// Bounding client rect as {x, y, width, height}
pub const CLIENT_RECT_JS: &str = r#"function() {
    const rect = this.getBoundingClientRect();
    return {x: rect.x, y: rect.y, width: rect.width, height: rect.height};
}"#;

/// Rendered text content
pub const TEXT_JS: &str = r#"function() {
    return this.innerText;
}"#;

/// Read a DOM property, falling back to the attribute
pub const ATTRIBUTE_JS: &str = r#"function(name) {
    const value = this[name];
    if (value !== undefined && value !== null) return String(value);
    const attr = this.getAttribute(name);
    return attr === null ? '' : attr;
}"#;

/// Assign a DOM property with any JSON value
pub const SET_ATTRIBUTE_JS: &str = r#"function(name, value) {
    this[name] = value;
    return true;
}"#;

/// Force a hidden element to render
pub const SHOW_JS: &str = r#"function() {
    this.style.display = 'block';
    this.style.visibility = 'visible';
    this.style.opacity = '1';
    return this.style.cssText;
}"#;
