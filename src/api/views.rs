//! Server-rendered pages. Markup is deliberately plain; the chart page only
//! exposes its series as JSON for whichever charting library the
//! deployment loads.

use axum::response::Html;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::fmt::Write;

use super::flash::Flash;
use crate::db::{Bloqueo, BloqueoEntry};
use crate::services::{AuthSession, BloqueoForm, CountRow, Dashboard};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn layout(title: &str, current: Option<&AuthSession>, flashes: &[Flash], body: &str) -> String {
    let mut html = String::with_capacity(body.len() + 1024);

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{} - Sistema de Bloqueos</title>\n</head>\n<body>\n<nav>\n",
        text(title)
    );

    if let Some(current) = current {
        let _ = write!(
            html,
            "<span class=\"user\">{}</span>\n<a href=\"/registro\">Registro</a>\n",
            text(&current.username)
        );
        if current.is_admin {
            html.push_str(
                "<a href=\"/admin\">Bloqueos</a>\n<a href=\"/admin/graficos\">Gráficos</a>\n",
            );
        }
        html.push_str("<a href=\"/logout\">Cerrar sesión</a>\n");
    }
    html.push_str("</nav>\n<main>\n");

    for flash in flashes {
        let _ = writeln!(
            html,
            "<div class=\"alert {}\" role=\"alert\">{}</div>",
            flash.level.css_class(),
            text(&flash.message)
        );
    }

    html.push_str(body);
    html.push_str("\n</main>\n</body>\n</html>\n");
    html
}

pub fn login_page(flashes: &[Flash], username: &str) -> Html<String> {
    let body = format!(
        "<h1>Iniciar sesión</h1>\n\
         <form method=\"post\" action=\"/login\">\n\
         <label for=\"username\">Usuario</label>\n\
         <input id=\"username\" name=\"username\" value=\"{}\" required>\n\
         <label for=\"password\">Contraseña</label>\n\
         <input id=\"password\" name=\"password\" type=\"password\" required>\n\
         <button type=\"submit\">Entrar</button>\n</form>",
        attr(username)
    );

    Html(layout("Iniciar sesión", None, flashes, &body))
}

fn input(name: &str, label: &str, kind: &str, value: Option<&str>) -> String {
    format!(
        "<label for=\"{name}\">{label}</label>\n\
         <input id=\"{name}\" name=\"{name}\" type=\"{kind}\" value=\"{}\" required>\n",
        attr(value.unwrap_or_default())
    )
}

pub fn registro_page(
    current: &AuthSession,
    flashes: &[Flash],
    form: &BloqueoForm,
    own: &[Bloqueo],
) -> Html<String> {
    let mut body = String::from(
        "<h1>Registrar bloqueo</h1>\n<form method=\"post\" action=\"/registro\">\n",
    );
    body.push_str(&input("fecha", "Fecha", "date", form.fecha.as_deref()));
    body.push_str(&input(
        "departamento",
        "Departamento",
        "text",
        form.departamento.as_deref(),
    ));
    body.push_str(&input("placa", "Placa", "text", form.placa.as_deref()));
    body.push_str(&input("barcode", "Código de barras", "text", form.barcode.as_deref()));
    body.push_str(&input("pin", "PIN", "text", form.pin.as_deref()));
    let _ = write!(
        body,
        "<label for=\"motivo\">Motivo</label>\n\
         <textarea id=\"motivo\" name=\"motivo\" required>{}</textarea>\n\
         <button type=\"submit\">Guardar</button>\n</form>\n",
        text(form.motivo.as_deref().unwrap_or_default())
    );

    body.push_str("<h2>Mis registros</h2>\n");
    if own.is_empty() {
        body.push_str("<p>Aún no has registrado bloqueos.</p>\n");
    } else {
        body.push_str(
            "<table>\n<thead><tr><th>Fecha</th><th>Departamento</th><th>Placa</th>\
             <th>Motivo</th></tr></thead>\n<tbody>\n",
        );
        for bloqueo in own.iter().rev() {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                bloqueo.fecha.format(DATE_FORMAT),
                text(&bloqueo.departamento),
                text(&bloqueo.placa),
                text(&bloqueo.motivo)
            );
        }
        body.push_str("</tbody>\n</table>\n");
    }

    Html(layout("Registro", Some(current), flashes, &body))
}

pub fn admin_page(current: &AuthSession, flashes: &[Flash], entries: &[BloqueoEntry]) -> Html<String> {
    let mut body = format!(
        "<h1>Registros de bloqueos</h1>\n<p>Total: {}</p>\n",
        entries.len()
    );

    body.push_str(
        "<table>\n<thead><tr><th>ID</th><th>Fecha</th><th>Departamento</th><th>Placa</th>\
         <th>Código de barras</th><th>PIN</th><th>Motivo</th><th>Usuario</th></tr></thead>\n<tbody>\n",
    );
    for entry in entries {
        let b = &entry.bloqueo;
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            b.id,
            b.fecha.format(DATE_FORMAT),
            text(&b.departamento),
            text(&b.placa),
            text(&b.barcode),
            text(&b.pin),
            text(&b.motivo),
            text(entry.username.as_deref().unwrap_or("-"))
        );
    }
    body.push_str("</tbody>\n</table>\n");

    Html(layout("Administración", Some(current), flashes, &body))
}

fn count_table(id: &str, caption: &str, header: &str, rows: &[CountRow]) -> String {
    let mut table = format!(
        "<table id=\"{id}\">\n<caption>{caption}</caption>\n\
         <thead><tr><th>{header}</th><th>Cantidad</th></tr></thead>\n<tbody>\n"
    );
    for row in rows {
        let _ = writeln!(
            table,
            "<tr><td>{}</td><td>{}</td></tr>",
            text(&row.label),
            row.count
        );
    }
    table.push_str("</tbody>\n</table>\n");
    table
}

/// JSON placed inside a `<script>` element must not be able to close it.
fn script_safe_json(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

pub fn graficos_page(current: &AuthSession, flashes: &[Flash], dashboard: &Dashboard) -> Html<String> {
    let charts = &dashboard.charts;
    let json = serde_json::to_string(charts).unwrap_or_else(|_| "{}".to_string());

    let mut body = format!(
        "<h1>Gráficos</h1>\n<p>Total de registros: {}</p>\n\
         <script type=\"application/json\" id=\"chart-data\">{}</script>\n",
        dashboard.bloqueos.len(),
        script_safe_json(&json)
    );
    body.push_str(&count_table(
        "departamentos",
        "Bloqueos por departamento",
        "Departamento",
        &charts.departamentos,
    ));
    body.push_str(&count_table(
        "fechas",
        "Bloqueos por fecha",
        "Fecha",
        &charts.fechas,
    ));
    body.push_str(&count_table(
        "placas",
        "Placas con más bloqueos",
        "Placa",
        &charts.placas,
    ));

    Html(layout("Gráficos", Some(current), flashes, &body))
}

#[must_use]
pub fn error_page(message: &str) -> String {
    let body = format!(
        "<h1>Error</h1>\n<p>{}</p>\n<p><a href=\"/\">Volver al inicio</a></p>",
        text(message)
    );
    layout("Error", None, &[], &body)
}
