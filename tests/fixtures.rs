#![allow(dead_code, reason = "shared between test targets")]

use std::sync::Once;

use cartesian::{DeriveError, Record, Template, alt};

static INIT: Once = Once::new();

/// Initialize the tracing subscriber for tests.
/// Only initializes once, even if called multiple times.
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::TRACE)
            .with_target(false)
            .init();
    });
}

fn build_box(hostname: &str, os: &str, arch: &str, ram: i64) -> Template {
    Template::object()
        .field("hostname", hostname)
        .field("os", os)
        .field("arch", arch)
        .field("ram", ram)
        .build()
}

fn build_test(binary: &str, sources: &str) -> Template {
    Template::object()
        .field("binary", binary)
        .field("sources", sources)
        .build()
}

fn cmdline(c: &Record) -> Result<String, DeriveError> {
    Ok(format!(
        "{} {} {} {}",
        c.str("compiler.binary")?,
        c.str("test.sources")?,
        c.str("compiler.output_option")?,
        c.str("test.binary")?
    ))
}

/// The build matrix: every box, every compiler, every test, with a derived
/// command line. The load test needs at least 8 GiB of RAM.
pub fn build_matrix() -> Template {
    let compiler = Template::object().field("output_option", "-o").build();
    let gcc = Template::object()
        .field("binary", "gcc")
        .field("version", "4.8.4")
        .chain(&compiler)
        .build();
    let clang = Template::object()
        .field("binary", "clang")
        .field("version", "3.4.1")
        .chain(&compiler)
        .build();
    let msvc = Template::object()
        .field("binary", "cl.exe")
        .field("version", "15.00.30729.01")
        .field("output_option", "/Fe")
        .chain(&compiler)
        .build();

    Template::object()
        .field(
            "box",
            alt([
                build_box("box1", "linux", "x86-64", 8),
                build_box("box2", "freebsd", "arm", 16),
                build_box("box3", "windows", "x86-64", 4),
                build_box("box4", "illumos", "sparc", 4),
            ]),
        )
        .field("compiler", alt([gcc, clang, msvc]))
        .field(
            "test",
            alt([
                build_test("frobnicate", "frobnicate.c"),
                build_test("loadtest", "loadtest.c helper.c"),
                build_test("end2end", "end2end.c helper.c"),
            ]),
        )
        .derive("cmdline", cmdline)
        .is(|c| Ok(!(c.str("test.binary")? == "loadtest" && c.number("box.ram")? < 8.0)))
        .build()
}
