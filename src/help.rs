use rustc_version_runtime::version;

use crate::version::VERSION;

pub fn usage_text() -> String {
    let rust_version = version();

    format!(
        r#"

 **minishell {version}**

A small interactive shell for everyday file work. Deletions go to a trash
directory and the last cp, mv or rm can always be undone.

Built with Rust {rust_version}

# 1. Commands
* cd [path], pwd, ls [-l] [path...], cat <file>
* grep [-r] [-i] <pattern> [path]
* cp [-r] <src> <dst>, mv <src> <dst>, rm [-r] <path...>
* undo, history [N]
* zip <folder> <archive.zip>, unzip <archive.zip>
* tar <folder> <archive.tar.gz>, untar <archive.tar.gz>
* help, exit

# 2. Files
* ~/.minishell.yaml        configuration (see 'minishell settings list')
* ~/.minishell/history.log command history
* ~/.minishell/shell.log   diagnostic log
* ~/.minishell/trash       removed files, restored by 'undo'

# 3. Archives
* Members with absolute paths or '..' segments abort extraction before anything is written
* '.git' directories are skipped when packing and unpacking
* An existing top-level directory is never overwritten; the archive lands in 'name-1', 'name-2', ...

"#,
        version = VERSION,
        rust_version = rust_version,
    )
}
