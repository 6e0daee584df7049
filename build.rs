/// Build script for Windows version metadata

fn main() {
    #[cfg(windows)]
    {
        let mut res = winres::WindowsResource::new();

        res.set_version_info(winres::VersionInfo::PRODUCTVERSION, 0x00010000);
        res.set_version_info(winres::VersionInfo::FILEVERSION, 0x00010000);

        res.set("ProductName", "Markdown Viewer");
        res.set("ProductVersion", env!("CARGO_PKG_VERSION"));
        res.set("FileDescription", "Markdown editor with live preview");
        res.set("OriginalFilename", "mdview-edit.exe");
        res.set("InternalName", "mdview-edit");

        if std::path::Path::new("icon.ico").exists() {
            res.set_icon("icon.ico");
        }

        if let Err(e) = res.compile() {
            println!("cargo:warning=Failed to compile Windows resources: {}", e);
        }
    }

    #[cfg(not(windows))]
    {
        println!("cargo:rerun-if-changed=build.rs");
    }
}
